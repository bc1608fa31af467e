//! # world-sync
//!
//! A single shared world of named entities, edited over REST or WebSocket,
//! with every accepted change pushed to every connected subscriber in
//! near-real-time.
//!
//! Each entity is a schemaless JSON record. Subscribers receive changes as
//! `{"<entity>": {..record..}}` frames, including changes they made
//! themselves, so the broadcast is the single source of truth.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)          ── edit surface
//!     ├── Subscriber Sessions (ws/)     ── inbound loop + outbound loop
//!     │
//!     ├── WorldStore (domain/)          ── mutate, then run change hooks
//!     │       │
//!     │       └── Broadcaster           ── one frame per live mailbox
//!     │               │
//!     │               └── Mailbox ×N    ── drained by each session
//!     │
//!     └── in-memory only
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::subscribe_handler;

/// Builds the full application router: REST edit surface, `/subscribe`
/// WebSocket endpoint, and static assets under `/static`.
pub fn build_app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(api::build_router())
        .route("/subscribe", get(subscribe_handler))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
