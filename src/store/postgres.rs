//! Postgres store backend.
//!
//! All handles share the `kv_entries` table and are separated by namespace.
//! Expired rows stay in the table until overwritten but are never returned.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use super::{KvStore, StoreError};

#[derive(Clone)]
pub struct PgKvStore {
    pool: PgPool,
    namespace: String,
}

impl PgKvStore {
    #[must_use]
    pub fn new(pool: PgPool, namespace: impl Into<String>) -> Self {
        Self { pool, namespace: namespace.into() }
    }
}

#[async_trait::async_trait]
impl KvStore for PgKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_entries
             WHERE namespace = $1 AND key = $2
               AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expires_at = ttl
            .and_then(|t| chrono::Duration::from_std(t).ok())
            .map(|t| Utc::now() + t);
        sqlx::query(
            "INSERT INTO kv_entries (namespace, key, value, expires_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (namespace, key)
             DO UPDATE SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at",
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_entries WHERE namespace = $1 AND key = $2")
            .bind(&self.namespace)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
