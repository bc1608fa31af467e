//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::SyncConfig;
use crate::domain::{Broadcaster, ChangeHook, WorldStore};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The shared world.
    pub store: Arc<WorldStore>,
    /// Live-subscriber set fed by the store's change hook.
    pub broadcaster: Broadcaster,
    /// Runtime configuration.
    pub config: Arc<SyncConfig>,
}

impl AppState {
    /// Builds a fresh store and broadcaster and wires the broadcaster in as
    /// the store's change hook.
    pub async fn new(config: SyncConfig) -> Self {
        let store = Arc::new(WorldStore::new());
        let broadcaster = Broadcaster::new();
        store
            .add_hook(Arc::new(broadcaster.clone()) as Arc<dyn ChangeHook>)
            .await;

        Self {
            store,
            broadcaster,
            config: Arc::new(config),
        }
    }
}
