//! Product catalog: fetch with a single time-boxed cache slot.
//!
//! DESIGN
//! ======
//! The catalog is a static JSON file (`{"product": [...]}`) hosted next to
//! the storefront. The chat route needs it on every request, so the parsed
//! product list is kept for `ttl` and refetched afterwards. The slot is an
//! explicit object with an injected clock so tests can seed and age it.
//!
//! TRADE-OFFS
//! ==========
//! Concurrent misses may fetch twice; the last write wins. A failed fetch
//! yields an empty product list and the chat continues without catalog
//! context.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::prompt::Product;

const CATALOG_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("catalog returned status {0}")]
    Status(u16),

    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl crate::error::ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_CATALOG_REQUEST",
            Self::Status(_) => "E_CATALOG_STATUS",
            Self::Parse(_) => "E_CATALOG_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status(500..=599))
    }
}

/// Upstream catalog response, unmodified.
#[derive(Debug, Clone)]
pub struct RawCatalog {
    pub status: u16,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
struct CachedCatalog {
    products: Vec<Product>,
    fetched_at: DateTime<Utc>,
}

pub struct CatalogCache {
    url: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
    entry: RwLock<Option<CachedCatalog>>,
}

impl CatalogCache {
    /// # Errors
    ///
    /// Returns [`CatalogError::Request`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(CATALOG_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { url: url.into(), ttl, clock, http, entry: RwLock::new(None) })
    }

    /// Current product list. Served from cache while fresh; a refetch
    /// failure is logged and yields an empty list.
    pub async fn products(&self) -> Vec<Product> {
        let now = self.clock.now();
        if let Some(cached) = self.entry.read().await.as_ref() {
            if self.is_fresh(cached, now) {
                return cached.products.clone();
            }
        }

        match self.fetch_products().await {
            Ok(products) => {
                info!(count = products.len(), "catalog refreshed");
                *self.entry.write().await = Some(CachedCatalog { products: products.clone(), fetched_at: now });
                products
            }
            Err(e) => {
                warn!(error = %e, url = %self.url, "catalog fetch failed; continuing without products");
                Vec::new()
            }
        }
    }

    /// Fetch the catalog body as-is, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Request`] if the upstream cannot be reached.
    pub async fn fetch_raw(&self) -> Result<RawCatalog, CatalogError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawCatalog { status, body })
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let raw = self.fetch_raw().await?;
        if raw.status != 200 {
            return Err(CatalogError::Status(raw.status));
        }
        parse_products(&raw.body)
    }

    fn is_fresh(&self, cached: &CachedCatalog, now: DateTime<Utc>) -> bool {
        match (now - cached.fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            // Clock went backwards; treat as fresh.
            Err(_) => true,
        }
    }

    #[cfg(test)]
    pub async fn seed(&self, products: Vec<Product>) {
        *self.entry.write().await = Some(CachedCatalog { products, fetched_at: self.clock.now() });
    }
}

/// Read the `product` array from a catalog document. A missing array is an
/// empty catalog.
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] if the body is not JSON or the products
/// do not match the expected shape.
pub fn parse_products(body: &[u8]) -> Result<Vec<Product>, CatalogError> {
    #[derive(serde::Deserialize)]
    struct CatalogDocument {
        #[serde(default)]
        product: Vec<Product>,
    }

    let doc: CatalogDocument = serde_json::from_slice(body)?;
    Ok(doc.product)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
