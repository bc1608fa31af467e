//! Entity endpoints: field merge, replace, and read.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::body::JsonBody;
use crate::api::dto::EntityEditRequest;
use crate::app_state::AppState;
use crate::domain::EntityId;
use crate::error::{ErrorResponse, SyncError};

/// `POST /entity/{id}` — Merge position and style fields into an entity.
///
/// Each field is applied with its own update, so subscribers see one change
/// per field.
///
/// # Errors
///
/// Returns [`SyncError`] if the body is not a JSON object or lacks `x`/`y`.
#[utoipa::path(
    post,
    path = "/entity/{id}",
    tag = "Entities",
    summary = "Merge entity fields",
    description = "Sets x and y (and colour/radius when present) on the entity, creating it if needed. Returns the entity's resulting record.",
    params(
        ("id" = String, Path, description = "Entity id"),
    ),
    request_body = EntityEditRequest,
    responses(
        (status = 200, description = "Resulting entity record", body = serde_json::Value),
        (status = 400, description = "Malformed body or missing x/y", body = ErrorResponse),
    )
)]
pub async fn merge_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, SyncError> {
    let entity = EntityId::from(id);
    let edit = EntityEditRequest::from_record(&body.into_record()?)?;
    let record = state
        .store
        .update_fields(&entity, edit.into_fields())
        .await;

    tracing::debug!(%entity, "entity merged");
    Ok(Json(record))
}

/// `PUT /entity/{id}` — Replace an entity's record wholesale.
///
/// # Errors
///
/// Returns [`SyncError`] if the body is not a JSON object.
#[utoipa::path(
    put,
    path = "/entity/{id}",
    tag = "Entities",
    summary = "Replace entity",
    description = "Replaces the entity's record with the request body. No field merge.",
    params(
        ("id" = String, Path, description = "Entity id"),
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Stored entity record", body = serde_json::Value),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
    )
)]
pub async fn replace_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, SyncError> {
    let entity = EntityId::from(id);
    let record = body.into_record()?;
    state.store.set(entity.clone(), record).await;

    tracing::debug!(%entity, "entity replaced");
    Ok(Json(state.store.get(&entity).await))
}

/// `GET /entity/{id}` — Read one entity.
///
/// Unknown entities read as `{}`.
#[utoipa::path(
    get,
    path = "/entity/{id}",
    tag = "Entities",
    summary = "Get entity",
    description = "Returns the entity's current record, or an empty object if it was never set.",
    params(
        ("id" = String, Path, description = "Entity id"),
    ),
    responses(
        (status = 200, description = "Entity record", body = serde_json::Value),
    )
)]
pub async fn get_entity(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    Json(state.store.get(&EntityId::from(id)).await)
}

/// Entity routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/entity/{id}",
        post(merge_entity).put(replace_entity).get(get_entity),
    )
}
