//! In-memory world store with change hooks.
//!
//! [`WorldStore`] owns the mapping from [`EntityId`] to [`EntityRecord`]. All
//! mutation goes through [`update`](WorldStore::update),
//! [`set`](WorldStore::set) and [`clear`](WorldStore::clear); readers always
//! receive copies.
//!
//! # Concurrency
//!
//! The mapping and the hook list sit behind one [`tokio::sync::RwLock`].
//! Every mutation applies its change and then runs all hooks *while still
//! holding the write lock*, so:
//!
//! - hooks observe fully applied state, never a partial write;
//! - two mutations can never interleave their hook calls, which gives every
//!   subscriber the same global order of events.
//!
//! Hooks are synchronous and must not block.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::mailbox::MailboxSender;
use super::{ChangeEvent, EntityId, EntityRecord, World};

/// Receiver of store change notifications.
///
/// Called synchronously, in registration order, once per accepted mutation.
pub trait ChangeHook: Send + Sync + fmt::Debug {
    /// Handles one change. Must return promptly.
    fn on_change(&self, event: &ChangeEvent);
}

#[derive(Debug, Default)]
struct Inner {
    space: World,
    hooks: Vec<Arc<dyn ChangeHook>>,
}

impl Inner {
    fn notify(&self, entity: &EntityId) {
        if self.hooks.is_empty() {
            return;
        }
        let record = self.space.get(entity).cloned().unwrap_or_default();
        let event = ChangeEvent::new(entity.clone(), record);
        for hook in &self.hooks {
            hook.on_change(&event);
        }
    }

    fn update(&mut self, entity: &EntityId, key: String, value: serde_json::Value) {
        self.space
            .entry(entity.clone())
            .or_default()
            .insert(key, value);
        self.notify(entity);
    }

    fn set(&mut self, entity: EntityId, record: EntityRecord) {
        self.space.insert(entity.clone(), record);
        self.notify(&entity);
    }
}

/// Process-wide shared world.
///
/// Constructed once by the composition root and shared behind an [`Arc`].
#[derive(Debug, Default)]
pub struct WorldStore {
    inner: RwLock<Inner>,
}

impl WorldStore {
    /// Creates an empty store with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a change hook. Hooks cannot be removed.
    pub async fn add_hook(&self, hook: Arc<dyn ChangeHook>) {
        self.inner.write().await.hooks.push(hook);
    }

    /// Sets one field of an entity, creating the entity if needed, and
    /// returns the resulting record.
    pub async fn update(
        &self,
        entity: &EntityId,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> EntityRecord {
        let mut inner = self.inner.write().await;
        inner.update(entity, key.into(), value);
        inner.space.get(entity).cloned().unwrap_or_default()
    }

    /// Applies [`update`](Self::update) once per field, in field order.
    ///
    /// Each field fires its own change event. The whole batch runs under a
    /// single write lock so no other mutation lands in between.
    pub async fn update_fields(&self, entity: &EntityId, fields: EntityRecord) -> EntityRecord {
        let mut inner = self.inner.write().await;
        for (key, value) in fields {
            inner.update(entity, key, value);
        }
        inner.space.get(entity).cloned().unwrap_or_default()
    }

    /// Replaces an entity's record wholesale.
    pub async fn set(&self, entity: EntityId, record: EntityRecord) {
        self.inner.write().await.set(entity, record);
    }

    /// Replaces every entity in `batch`, one `set` per entry in iteration
    /// order. Entities not named in `batch` are left untouched.
    ///
    /// The whole batch runs under a single write lock.
    pub async fn set_many<I>(&self, batch: I)
    where
        I: IntoIterator<Item = (EntityId, EntityRecord)>,
    {
        let mut inner = self.inner.write().await;
        for (entity, record) in batch {
            inner.set(entity, record);
        }
    }

    /// Returns a copy of the entity's record, or an empty record if it has
    /// never been set.
    pub async fn get(&self, entity: &EntityId) -> EntityRecord {
        self.inner
            .read()
            .await
            .space
            .get(entity)
            .cloned()
            .unwrap_or_default()
    }

    /// Discards every entity. Fires no change events.
    pub async fn clear(&self) {
        self.inner.write().await.space.clear();
    }

    /// Returns a snapshot of the whole world.
    pub async fn world(&self) -> World {
        self.inner.read().await.space.clone()
    }

    /// Number of entities currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.space.len()
    }

    /// Returns `true` if the world holds no entities.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.space.is_empty()
    }

    /// Queues a full-world snapshot frame into `mailbox`.
    ///
    /// The snapshot is taken and queued under the read lock, so it lands in
    /// the mailbox strictly after every event for mutations it contains and
    /// strictly before every event for mutations it does not.
    ///
    /// Returns `false` if the frame could not be encoded or the mailbox is
    /// closed.
    pub async fn catch_up(&self, mailbox: &MailboxSender) -> bool {
        let inner = self.inner.read().await;
        match serde_json::to_string(&inner.space) {
            Ok(frame) => mailbox.put(Arc::from(frame)),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode world snapshot");
                false
            }
        }
    }
}
