//! Catalog passthrough: proxies the upstream product file unmodified.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::error_response;
use crate::error::ErrorCode;
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch product catalog.";

pub async fn passthrough(State(state): State<AppState>) -> Response {
    match state.catalog.fetch_raw().await {
        Ok(raw) if (200..300).contains(&raw.status) => ([(CONTENT_TYPE, "application/json")], raw.body).into_response(),
        Ok(raw) => {
            warn!(status = raw.status, "catalog: upstream returned an error status");
            let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, FETCH_FAILED)
        }
        Err(e) => {
            warn!(code = e.error_code(), error = %e, "catalog: upstream unreachable");
            error_response(StatusCode::BAD_GATEWAY, FETCH_FAILED)
        }
    }
}
