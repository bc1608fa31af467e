//! Domain layer: the shared world, change events, and fan-out.
//!
//! This module holds everything with real concurrency concerns: the
//! [`WorldStore`] with its change hooks, the per-subscriber [`Mailbox`], and
//! the [`Broadcaster`] that turns one change into one frame per live
//! subscriber.

pub mod broadcaster;
pub mod change_event;
pub mod entity;
pub mod entity_id;
pub mod mailbox;
pub mod session_id;
pub mod store;

pub use broadcaster::Broadcaster;
pub use change_event::ChangeEvent;
pub use entity::{EntityRecord, World, record_from_value};
pub use entity_id::EntityId;
pub use mailbox::{Frame, Mailbox, MailboxSender, mailbox};
pub use session_id::SessionId;
pub use store::{ChangeHook, WorldStore};
