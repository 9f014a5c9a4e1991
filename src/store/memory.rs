//! In-process store backend.
//!
//! Used when `DATABASE_URL` is not set and as the fixture backend in tests.
//! Expiry is evaluated against the injected clock on read, so tests can step
//! past midnight without sleeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{KvStore, StoreError};
use crate::clock::Clock;

struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), clock }
    }

    /// Number of live (non-expired) entries.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !is_expired(e, now))
            .count()
    }
}

fn is_expired(entry: &Entry, now: DateTime<Utc>) -> bool {
    entry.expires_at.is_some_and(|at| at <= now)
}

#[async_trait::async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| !is_expired(e, now))
            .map(|e| e.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expires_at = ttl
            .and_then(|t| chrono::Duration::from_std(t).ok())
            .map(|t| self.clock.now() + t);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_owned(), Entry { value: value.to_owned(), expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
