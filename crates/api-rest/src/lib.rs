//! # API REST
//!
//! REST API implementation for Dropshare.
//!
//! Handles:
//! - HTTP endpoints with axum (`POST /upload`, `GET /download`, `GET /health`)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (multipart parsing, JSON errors, CORS, body limits)
//! - The background expiry sweep
//!
//! Uses `api-shared` for wire types and `dropshare-core` for the artifact lifecycle.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
pub mod sweeper;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use dropshare_core::ShareService;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, Operation};
pub use sweeper::spawn_sweeper;

/// Headroom on top of the payload limit for multipart boundaries and part headers.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub share: ShareService,
}

impl AppState {
    pub fn new(share: ShareService) -> Self {
        Self { share }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::upload, handlers::download),
    components(schemas(
        api_shared::HealthRes,
        api_shared::UploadRes,
        api_shared::ErrorRes,
        api_shared::UploadForm,
    ))
)]
pub struct ApiDoc;

/// Builds the full HTTP router.
///
/// The upload route carries a body limit of the configured payload limit plus
/// [`MULTIPART_OVERHEAD_BYTES`]; the exact payload limit is enforced by the core service.
pub fn router(state: AppState) -> Router {
    let payload_limit = usize::try_from(state.share.config().max_upload_bytes()).unwrap_or(usize::MAX);
    let body_limit = payload_limit.saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/download", get(handlers::download))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_error_and_upload_schemas() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        let upload = &doc["paths"]["/upload"]["post"];
        let form = upload["requestBody"]["content"]["multipart/form-data"]["schema"]["$ref"]
            .as_str()
            .unwrap();
        assert!(form.ends_with("/UploadForm"));

        let not_found = &doc["paths"]["/download"]["get"]["responses"]["404"];
        let error = not_found["content"]["application/json"]["schema"]["$ref"]
            .as_str()
            .unwrap();
        assert!(error.ends_with("/ErrorRes"));
    }
}
