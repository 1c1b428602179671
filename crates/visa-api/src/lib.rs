//! visa-api - HTTP API for visa-tracker
//!
//! The router is built here so that the binary and the integration tests
//! serve exactly the same routes and middleware.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query_types;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{get, patch},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use visa_core::defaults::REQUEST_BODY_LIMIT_BYTES;
use visa_db::Database;

use crate::config::ServerConfig;
use crate::handlers::{applications, documents, system};
use crate::middleware::{
    payload_too_large_envelope, rate_limit_middleware, GlobalRateLimiter, MakeRequestUuidV7,
};

pub use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(db: Database, rate_limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        Self { db, rate_limiter }
    }
}

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Visa Tracker API",
        description = "Track visa applications and the documents each one needs"
    ),
    paths(
        handlers::applications::list_applications,
        handlers::applications::create_application,
        handlers::applications::get_application,
        handlers::applications::update_application,
        handlers::applications::delete_application,
        handlers::documents::list_documents,
        handlers::documents::create_document,
        handlers::documents::get_document,
        handlers::documents::update_document,
        handlers::documents::delete_document,
        handlers::documents::toggle_document,
        handlers::system::health_check,
        handlers::system::api_test,
    ),
    components(schemas(
        visa_core::Application,
        visa_core::ApplicationWithDocuments,
        visa_core::ApplicationPatch,
        visa_core::ApplicationStatus,
        visa_core::CreateApplicationRequest,
        visa_core::CreateDocumentRequest,
        visa_core::Document,
        visa_core::DocumentPatch,
        visa_core::VisaType,
    )),
    tags(
        (name = "Applications", description = "Visa application lifecycle"),
        (name = "Documents", description = "Documents attached to an application"),
        (name = "System", description = "Health and connectivity"),
    )
)]
pub struct ApiDoc;

/// Resource routes. Served at the root and again under `/api`.
///
/// A known path hit with an unsupported method gets the same 404 envelope as
/// an unknown path.
fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(applications::list_applications)
                .post(applications::create_application)
                .fallback(system::route_not_found),
        )
        .route(
            "/applications/:id",
            get(applications::get_application)
                .put(applications::update_application)
                .delete(applications::delete_application)
                .fallback(system::route_not_found),
        )
        .route(
            "/applications/:id/documents",
            get(documents::list_documents)
                .post(documents::create_document)
                .fallback(system::route_not_found),
        )
        .route(
            "/documents/:id",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document)
                .fallback(system::route_not_found),
        )
        .route(
            "/documents/:id/toggle",
            patch(documents::toggle_document)
                .put(documents::toggle_document)
                .fallback(system::route_not_found),
        )
}

/// Build the full application router with middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route(
            "/health",
            get(system::health_check).fallback(system::route_not_found),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(resource_routes())
        .nest(
            "/api",
            resource_routes().route(
                "/test",
                get(system::api_test).fallback(system::route_not_found),
            ),
        )
        .fallback(system::route_not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
        .layer(axum::middleware::map_response(payload_too_large_envelope))
        .with_state(state)
}
