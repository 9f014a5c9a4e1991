//! Key-value storage used for chat history and daily counters.
//!
//! DESIGN
//! ======
//! The service only needs `get`/`put`/`delete` with an optional per-key TTL.
//! There is no atomic increment or compare-and-swap on purpose: counters are
//! read-modify-write and concurrent writers may under-count by one.
//!
//! Two handles are built at startup, one for history + user rate counters
//! and one for credential usage. Each handle is a namespace over the same
//! backend.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use memory::MemoryKvStore;
pub use postgres::PgKvStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("stored value for {key} is not valid JSON: {source}")]
    Decode { key: String, source: serde_json::Error },
    #[error("value for {key} could not be encoded: {source}")]
    Encode { key: String, source: serde_json::Error },
}

#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the raw value for `key`. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace `key`. With `ttl`, the entry disappears once it elapses.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] when the stored text is not valid JSON for `T`.
pub async fn get_json<T>(store: &dyn KvStore, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode { key: key.to_owned(), source })
}

/// Encode and write a JSON value.
///
/// # Errors
///
/// Returns a backend error from the store, or [`StoreError::Encode`].
pub async fn put_json<T>(store: &dyn KvStore, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode { key: key.to_owned(), source })?;
    store.put(key, &raw, ttl).await
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
