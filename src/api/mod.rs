pub mod auth;
pub mod error;
pub mod extract;
pub mod headers;
pub mod models;
pub mod review;
pub mod validation;


// Re-exports
pub use error::AppError;
pub use models::*;

use axum::{Router, middleware, response::Response};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

/// Build the full application router.
///
/// `base_path` must already be normalized (`""` or `/a/b`). Requests pass,
/// outermost first, through tracing, response headers (CORS, preflight),
/// the panic guard and the API key check before reaching a route.
pub fn app(state: AppState, base_path: &str) -> Router {
    let routes = review::routes();
    let router = if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(base_path, routes)
    };

    router
        .fallback(endpoint_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(headers::apply_response_headers))
        .layer(TraceLayer::new_for_http())
}

async fn endpoint_not_found() -> AppError {
    AppError::EndpointNotFound
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Request handler panicked");
    axum::response::IntoResponse::into_response(AppError::Internal)
}
