//! REST endpoint handlers organized by resource.

pub mod entity;
pub mod system;
pub mod world;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(entity::routes())
        .merge(world::routes())
        .merge(system::routes())
}
