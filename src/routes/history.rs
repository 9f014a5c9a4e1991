//! `GET` / `DELETE /chat-history?userId=`: read or clear a shopper's history.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::error_response;
use crate::history;
use crate::services::chat::{USER_ID_REQUIRED, require_user_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn get_history(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Response {
    let Ok(user_id) = require_user_id(query.user_id.as_deref()) else {
        return error_response(StatusCode::BAD_REQUEST, USER_ID_REQUIRED);
    };

    match history::load(state.chat_store.as_ref(), user_id).await {
        Ok(turns) => Json(json!({ "history": turns })).into_response(),
        Err(e) => {
            error!(user_id, error = %e, "history: read failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch chat history.")
        }
    }
}

pub async fn delete_history(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Response {
    let Ok(user_id) = require_user_id(query.user_id.as_deref()) else {
        return error_response(StatusCode::BAD_REQUEST, USER_ID_REQUIRED);
    };

    match history::delete(state.chat_store.as_ref(), user_id).await {
        Ok(()) => {
            info!(user_id, "history: deleted");
            Json(json!({ "message": "Chat history deleted successfully." })).into_response()
        }
        Err(e) => {
            error!(user_id, error = %e, "history: delete failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete chat history.")
        }
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
