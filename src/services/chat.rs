//! Chat service: one shopper message in, one assistant reply out.
//!
//! DESIGN
//! ======
//! Strictly sequential per request:
//!
//! 1. validate the user id
//! 2. charge the per-user daily rate limit
//! 3. load history (a read failure degrades to an empty conversation)
//! 4. pick the first credential under its daily quota
//! 5. call the LLM with catalog + cart context and the conversation
//! 6. on success: charge the credential, append the exchange, persist
//!
//! Any failure before step 6 leaves history and credential usage untouched.
//!
//! TRADE-OFFS
//! ==========
//! The store offers no compare-and-swap, so concurrent requests may both
//! pass a counter check or overwrite each other's history (last writer
//! wins). Limits are soft ceilings and this is accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::history;
use crate::llm::types::LlmError;
use crate::prompt::{self, CartItem};
use crate::state::AppState;
use crate::store::StoreError;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    NotConfigured(&'static str),
    #[error("You have reached the daily chat limit ({limit} messages). Please try again tomorrow.")]
    RateLimited { limit: u32 },
    #[error("All assistant credentials have reached their daily quota. Please try again later.")]
    CapacityExhausted,
    #[error("AI error: {}", LlmError::upstream_message(.0))]
    Upstream(#[from] LlmError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("reply generated but chat history could not be saved: {0}")]
    Persist(StoreError),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NotConfigured(_) => "E_NOT_CONFIGURED",
            Self::RateLimited { .. } => "E_RATE_LIMITED",
            Self::CapacityExhausted => "E_CAPACITY_EXHAUSTED",
            Self::Upstream(_) => "E_UPSTREAM",
            Self::Storage(_) => "E_STORAGE",
            Self::Persist(_) => "E_PERSIST",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::CapacityExhausted | Self::Storage(_) => true,
            Self::Upstream(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Body of `POST /ai-assistant`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cart_items: Option<Vec<CartItem>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ai_structured_input: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

pub(crate) const USER_ID_REQUIRED: &str = "User ID is required.";

/// Returns the trimmed user id, or a validation error when absent or blank.
///
/// # Errors
///
/// Returns [`ChatError::Validation`] for a missing or blank id.
pub fn require_user_id(raw: Option<&str>) -> Result<&str, ChatError> {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ChatError::Validation(USER_ID_REQUIRED)),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Run one chat turn for the requesting shopper.
///
/// # Errors
///
/// Returns a [`ChatError`] naming the stage the request stopped at.
pub async fn handle_chat(state: &AppState, request: ChatRequest) -> Result<ChatReply, ChatError> {
    let user_id = require_user_id(request.user_id.as_deref())?;
    let message = request.message.as_deref().unwrap_or_default();

    let Some(llm) = state.llm.as_ref() else {
        return Err(ChatError::NotConfigured("AI provider not configured."));
    };
    let credentials = &state.config.credentials;
    if credentials.is_empty() {
        return Err(ChatError::NotConfigured("No AI credentials configured."));
    }

    if !state.rate_limiter.check_and_consume(user_id).await? {
        info!(user_id, limit = state.rate_limiter.daily_limit(), "chat: user rate limited");
        return Err(ChatError::RateLimited { limit: state.rate_limiter.daily_limit() });
    }

    let mut conversation = match history::load(state.chat_store.as_ref(), user_id).await {
        Ok(turns) => turns,
        Err(e) => {
            warn!(user_id, error = %e, "chat: history read failed; starting fresh");
            Vec::new()
        }
    };

    let Some(credential) = state.quota.select_available_credential(credentials).await? else {
        warn!(
            user_id,
            credentials = credentials.len(),
            limit = state.quota.daily_limit(),
            "chat: every credential is at its daily quota"
        );
        return Err(ChatError::CapacityExhausted);
    };

    let products = state.catalog.products().await;
    let cart = request.cart_items.unwrap_or_default();
    let system = prompt::build_system_prompt(&state.config.store_name, &products, &cart);
    let messages = prompt::build_conversation(&conversation, message, request.ai_structured_input.as_ref());

    let response = match llm.chat(&credential, &system, &messages).await {
        Ok(response) => response,
        Err(e) => {
            warn!(user_id, credential = %credential, code = e.error_code(), error = %e, "chat: upstream call failed");
            return Err(e.into());
        }
    };
    let Some(reply) = response.text() else {
        warn!(user_id, credential = %credential, "chat: upstream returned no text");
        return Err(LlmError::EmptyResponse.into());
    };
    info!(
        user_id,
        credential = %credential,
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "chat: reply generated"
    );

    if let Err(e) = state.quota.record_usage(&credential).await {
        warn!(credential = %credential, error = %e, "chat: failed to record credential usage");
    }

    history::append_exchange(&mut conversation, message, &reply, state.config.limits.max_history_length);
    history::save(state.chat_store.as_ref(), user_id, &conversation)
        .await
        .map_err(ChatError::Persist)?;

    Ok(ChatReply { reply })
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
