//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The storefront frontend is served from another origin, so every response
//! carries the configured CORS headers and any `OPTIONS` request is answered
//! here with 204 before routing. This is a small middleware rather than
//! `tower_http::cors::CorsLayer`, which only adds headers to CORS requests
//! and does not answer every `OPTIONS` with 204. Errors leave the service as
//! `{"error": "<message>"}` with the status chosen by each route.

pub mod assistant;
pub mod catalog;
pub mod history;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const ALLOWED_METHODS: &str = "GET,HEAD,POST,PUT,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";
const MAX_AGE_SECS: &str = "86400";

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let catalog_path = state.config.catalog_path.clone();

    Router::new()
        .route("/ai-assistant", post(assistant::chat).fallback(method_not_allowed))
        .route(
            "/chat-history",
            get(history::get_history)
                .delete(history::delete_history)
                .fallback(method_not_allowed),
        )
        .route(&catalog_path, get(catalog::passthrough).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// CORS
// =============================================================================

async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    apply_cors_headers(response.headers_mut(), &state.config.cors_origin);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
}

// =============================================================================
// SHARED RESPONSES
// =============================================================================

/// JSON error body used by every route.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
