//! geoschool service library
//!
//! HTTP handlers, router and configuration for the school locator service.
//! This library is used by both the geoschool-service binary and
//! integration tests.

pub mod config;
pub mod error;
pub mod handlers;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{uri::PathAndQuery, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use geoschool::SchoolStore;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// API routes matched without regard to case or a trailing slash.
const API_ROUTES: [&str; 3] = ["/", "/api/addSchool", "/api/listSchools"];

/// Application state shared across handlers.
pub struct AppState {
    /// School storage.
    pub store: Arc<dyn SchoolStore>,
}

impl AppState {
    /// Wrap a store for sharing across handlers.
    pub fn new(store: impl SchoolStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// OpenAPI documentation for the school service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Management API",
        version = "1.0.0",
        description = "Register schools and list them by distance from a location.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(handlers::add_school, handlers::list_schools, handlers::banner),
    components(schemas(
        handlers::AddSchoolRequest,
        handlers::AddSchoolResponse,
        handlers::ListSchoolsResponse,
        handlers::BannerResponse,
        handlers::Endpoints,
        error::ErrorResponse,
    )),
    tags(
        (name = "schools", description = "School registration and lookup"),
        (name = "system", description = "System endpoints")
    )
)]
pub struct ApiDoc;

/// Build the service router with all routes and middleware.
pub fn app(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::banner).fallback(handlers::not_found))
        .route(
            "/api/addSchool",
            post(handlers::add_school).fallback(handlers::not_found),
        )
        .route(
            "/api/listSchools",
            get(handlers::list_schools).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(AnyOrigin)
                        .allow_methods(AnyOrigin)
                        .allow_headers(AnyOrigin),
                )
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state);

    // Path rewriting has to run before routing, so it wraps the whole router
    let canonical = middleware::map_request(canonicalize_path).layer(routes);
    Router::new().fallback_service(canonical)
}

/// Rewrite `/API/listschools/` and similar spellings to the registered route.
async fn canonicalize_path(mut request: Request) -> Request {
    let path = request.uri().path();
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let Some(route) = API_ROUTES
        .iter()
        .copied()
        .find(|route| route.eq_ignore_ascii_case(trimmed) && *route != path)
    else {
        return request;
    };

    let rewritten = match request.uri().query() {
        Some(query) => format!("{route}?{query}"),
        None => route.to_string(),
    };

    let mut parts = request.uri().clone().into_parts();
    if let Ok(path_and_query) = rewritten.parse::<PathAndQuery>() {
        parts.path_and_query = Some(path_and_query);
        if let Ok(uri) = Uri::from_parts(parts) {
            tracing::debug!(from = %request.uri(), to = %uri, "Canonicalized request path");
            *request.uri_mut() = uri;
        }
    }
    request
}

/// Turn a handler panic into an opaque 500 response.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Unhandled error");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error::ErrorResponse::with_message(
            "Internal server error",
            "Something went wrong on the server",
        )),
    )
        .into_response()
}

// Re-export commonly used types for convenience
pub use config::ServiceConfig;
pub use error::{ApiError, ErrorResponse, ValidationError};
pub use handlers::{AddSchoolRequest, AddSchoolResponse, BannerResponse, ListSchoolsResponse};
