//! WebSocket layer: subscriber sessions and inbound edit frames.
//!
//! The endpoint at `/subscribe` streams every world change to the client
//! and accepts edits from it in the same frame format.

pub mod frame;
pub mod handler;
pub mod session;
