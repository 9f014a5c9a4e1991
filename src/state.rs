//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the immutable config, the two key-value stores (chat history + user
//! rate counters, and credential usage), the counters built on them, the
//! catalog cache, and the optional LLM client. Everything is `Arc`-backed so
//! cloning per request is cheap.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogCache, CatalogError};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::llm::LlmChat;
use crate::quota::QuotaTracker;
use crate::rate_limit::RateLimiter;
use crate::store::KvStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Optional LLM client. `None` if the provider could not be configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// History lives here, keyed by user id.
    pub chat_store: Arc<dyn KvStore>,
    pub rate_limiter: RateLimiter,
    pub quota: QuotaTracker,
    pub catalog: Arc<CatalogCache>,
}

impl AppState {
    /// Wire the counters and catalog cache over the given stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog HTTP client cannot be built.
    pub fn new(
        config: AppConfig,
        llm: Option<Arc<dyn LlmChat>>,
        chat_store: Arc<dyn KvStore>,
        quota_store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CatalogError> {
        let rate_limiter = RateLimiter::new(chat_store.clone(), clock.clone(), config.limits.daily_rate_limit);
        let quota = QuotaTracker::new(quota_store, clock.clone(), config.limits.credential_daily_limit);
        let catalog = CatalogCache::new(
            config.catalog_url.clone(),
            Duration::from_secs(config.catalog_cache_secs),
            clock,
        )?;

        Ok(Self { config: Arc::new(config), llm, chat_store, rate_limiter, quota, catalog: Arc::new(catalog) })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{TimeZone, Utc};

    use crate::clock::ManualClock;
    use crate::config::{DEFAULT_CATALOG_PATH, DEFAULT_CORS_ORIGIN, Limits};
    use crate::llm::types::{ChatResponse, ContentBlock, LlmError, Message};
    use crate::quota::Credential;
    use crate::store::MemoryKvStore;

    /// LLM stub that answers every call with the same text.
    pub struct FixedReplyLlm(pub String);

    #[async_trait::async_trait]
    impl LlmChat for FixedReplyLlm {
        async fn chat(&self, _credential: &Credential, _system: &str, _messages: &[Message]) -> Result<ChatResponse, LlmError> {
            Ok(ChatResponse {
                content: vec![ContentBlock::Text { text: self.0.clone() }],
                model: "fixed".into(),
                stop_reason: "end_turn".into(),
                input_tokens: 0,
                output_tokens: 0,
            })
        }
    }

    /// In-memory fixture: both stores, the clock, and the state built on them.
    pub struct TestApp {
        pub state: AppState,
        pub clock: Arc<ManualClock>,
        pub chat_store: Arc<MemoryKvStore>,
        pub quota_store: Arc<MemoryKvStore>,
    }

    #[must_use]
    pub fn test_config(credentials: &[&str]) -> AppConfig {
        AppConfig {
            port: 0,
            database_url: None,
            chat_store_namespace: "chat_history".into(),
            quota_store_namespace: "credential_usage".into(),
            credentials: credentials.iter().map(|c| Credential::new(*c)).collect(),
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            // Unreachable: the catalog is seeded by tests that need products.
            catalog_url: "http://127.0.0.1:9/products.json".into(),
            catalog_path: DEFAULT_CATALOG_PATH.into(),
            catalog_cache_secs: 300,
            store_name: "Test Store".into(),
            limits: Limits::default(),
        }
    }

    /// Build a `TestApp` at 2025-03-01 10:00 UTC.
    #[must_use]
    pub fn test_app(config: AppConfig, llm: Option<Arc<dyn LlmChat>>) -> TestApp {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()));
        let chat_store = Arc::new(MemoryKvStore::new(clock.clone()));
        let quota_store = Arc::new(MemoryKvStore::new(clock.clone()));
        let state = AppState::new(config, llm, chat_store.clone(), quota_store.clone(), clock.clone())
            .expect("catalog client should build");
        TestApp { state, clock, chat_store, quota_store }
    }

    /// Default config with two credentials and the given LLM.
    #[must_use]
    pub fn test_app_with_llm(llm: Arc<dyn LlmChat>) -> TestApp {
        test_app(test_config(&["key-primary", "key-secondary"]), Some(llm))
    }
}
