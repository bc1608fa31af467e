//! World endpoints: snapshot, bulk replace, and reset.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::body::JsonBody;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, SyncError};
use crate::ws::frame::parse_edit_value;

/// `GET /world` — Snapshot of every entity.
#[utoipa::path(
    get,
    path = "/world",
    tag = "World",
    summary = "Get world",
    description = "Returns the whole world as an object mapping entity id to record.",
    responses(
        (status = 200, description = "World snapshot", body = serde_json::Value),
    )
)]
pub async fn get_world(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.world().await)
}

/// `POST /world` — Replace every entity named in the body.
///
/// Entities not named in the body are kept. Each named entity is set
/// individually and broadcast as its own change, in body order.
///
/// # Errors
///
/// Returns [`SyncError::InvalidRequest`] unless the body is an object whose
/// values are all objects. Nothing is applied in that case.
#[utoipa::path(
    post,
    path = "/world",
    tag = "World",
    summary = "Bulk replace entities",
    description = "Sets each entity in the body (id -> record) and returns the resulting world.",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Resulting world", body = serde_json::Value),
        (status = 400, description = "Body is not an object of records", body = ErrorResponse),
    )
)]
pub async fn replace_world(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<impl IntoResponse, SyncError> {
    let batch =
        parse_edit_value(body.0).map_err(|e| SyncError::InvalidRequest(e.to_string()))?;
    let count = batch.len();
    state.store.set_many(batch).await;

    tracing::debug!(entities = count, "world bulk replace");
    Ok(Json(state.store.world().await))
}

/// `GET|POST /clear` — Discard every entity.
///
/// No change events are broadcast; subscribers that need the reset must
/// re-read `/world`.
#[utoipa::path(
    post,
    path = "/clear",
    tag = "World",
    summary = "Clear world",
    description = "Removes every entity and returns the (empty) world. Also reachable with GET.",
    responses(
        (status = 200, description = "Empty world", body = serde_json::Value),
    )
)]
pub async fn clear_world(State(state): State<AppState>) -> impl IntoResponse {
    state.store.clear().await;
    tracing::info!("world cleared");
    Json(state.store.world().await)
}

/// World routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/world", get(get_world).post(replace_world))
        .route("/clear", get(clear_world).post(clear_world))
}
