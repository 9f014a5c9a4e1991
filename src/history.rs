//! Per-user conversation history.
//!
//! Stored as a JSON array of `{role, text}` under `history:{user_id}` in the
//! chat store. The prefix keeps shopper-chosen ids out of the rate-limit key
//! space that shares the same store. Only whole user/AI pairs are appended, then the oldest entries are
//! dropped until the cap holds.

use serde::{Deserialize, Serialize};

use crate::store::{self, KvStore, StoreError};

const KEY_PREFIX: &str = "history";

#[must_use]
pub fn history_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}:{user_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self { role: Role::Ai, text: text.into() }
    }
}

/// Append one exchange and keep only the newest `max_len` entries.
pub fn append_exchange(history: &mut Vec<ChatTurn>, user_text: &str, ai_text: &str, max_len: usize) {
    history.push(ChatTurn::user(user_text));
    history.push(ChatTurn::ai(ai_text));
    truncate_oldest(history, max_len);
}

pub fn truncate_oldest(history: &mut Vec<ChatTurn>, max_len: usize) {
    if history.len() > max_len {
        let excess = history.len() - max_len;
        history.drain(..excess);
    }
}

/// Load the stored history for `user_id`. Absent history is empty.
///
/// # Errors
///
/// Returns a [`StoreError`] if the read fails or the stored value is not a
/// history array.
pub async fn load(store: &dyn KvStore, user_id: &str) -> Result<Vec<ChatTurn>, StoreError> {
    Ok(store::get_json(store, &history_key(user_id))
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns a [`StoreError`] if the write fails.
pub async fn save(store: &dyn KvStore, user_id: &str, history: &[ChatTurn]) -> Result<(), StoreError> {
    store::put_json(store, &history_key(user_id), history, None).await
}

/// # Errors
///
/// Returns a [`StoreError`] if the delete fails.
pub async fn delete(store: &dyn KvStore, user_id: &str) -> Result<(), StoreError> {
    store.delete(&history_key(user_id)).await
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
