//! `POST /ai-assistant`: one chat turn.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::{error, warn};

use super::error_response;
use crate::error::ErrorCode;
use crate::services::chat::{self, ChatError, ChatRequest};
use crate::state::AppState;

pub async fn chat(State(state): State<AppState>, body: Result<Json<ChatRequest>, JsonRejection>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "assistant: rejected request body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match chat::handle_chat(&state, request).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            let status = chat_error_to_status(&e);
            if status.is_server_error() {
                error!(code = e.error_code(), retryable = e.retryable(), error = %e, "assistant: request failed");
            }
            error_response(status, e.to_string())
        }
    }
}

pub(crate) fn chat_error_to_status(err: &ChatError) -> StatusCode {
    match err {
        ChatError::Validation(_) => StatusCode::BAD_REQUEST,
        ChatError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ChatError::CapacityExhausted => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::NotConfigured(_) | ChatError::Upstream(_) | ChatError::Storage(_) | ChatError::Persist(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
