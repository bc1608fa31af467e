//! OpenAPI document for the edit surface.

use utoipa::OpenApi;

use crate::api::dto::{EntityEditRequest, HealthResponse};
use crate::api::handlers::{entity, system, world};
use crate::error::{ErrorBody, ErrorResponse};

/// Path at which the OpenAPI JSON is served.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "world-sync",
        description = "Shared entity world with REST edits and WebSocket fan-out. Subscribe at GET /subscribe."
    ),
    paths(
        entity::merge_entity,
        entity::replace_entity,
        entity::get_entity,
        world::get_world,
        world::replace_world,
        world::clear_world,
        system::health_handler,
    ),
    components(schemas(EntityEditRequest, HealthResponse, ErrorResponse, ErrorBody)),
    tags(
        (name = "Entities", description = "Single-entity edits and reads"),
        (name = "World", description = "Whole-world snapshot, bulk edit and reset"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;
