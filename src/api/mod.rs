//! REST API layer: route handlers, DTOs, extractors and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod extract;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "attendance-gateway",
        description = "QR check-in gateway: token resolution, attendance window classification and audit log."
    ),
    paths(
        handlers::check_in::check_in,
        handlers::check_in::check_in_at_event,
        handlers::events::create_event,
        handlers::events::get_event,
        handlers::events::create_participant,
        handlers::events::register_participant,
        handlers::events::attendance_summary,
        handlers::events::attendance_log,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Check-in", description = "Checkpoint scanning"),
        (name = "Events", description = "Events, participants and registrations"),
        (name = "Reports", description = "Dashboard counts and audit log"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST API, live feed, API docs and the
/// HTTP middleware stack.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_checkpoint_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/check-in"));
        assert!(doc.paths.paths.contains_key("/api/v1/events/{id}/check-in"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
