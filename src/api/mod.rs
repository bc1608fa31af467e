//! REST edit surface: route handlers, DTOs, and router composition.

pub mod body;
pub mod doc;
pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete REST router, including the OpenAPI document.
pub fn build_router() -> Router<AppState> {
    let router = handlers::routes();

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url(doc::OPENAPI_PATH, doc::ApiDoc::openapi()),
        )
    };

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        doc::OPENAPI_PATH,
        axum::routing::get(|| async {
            use utoipa::OpenApi;
            axum::Json(doc::ApiDoc::openapi())
        }),
    );

    router
}
