//! Service configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Everything is read once at startup into `AppConfig`. Credentials are
//! collected into an explicit ordered list here so request handling never
//! reads the environment.
//!
//! Credential order:
//! - `LLM_API_KEY` (unnumbered default) first
//! - `LLM_API_KEY_<n>` after it, ascending by `n`; gaps are allowed
//! - blank values dropped, duplicates keep their first position

use std::ffi::OsString;

use axum::http::HeaderValue;

use crate::quota::Credential;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5500";
pub const DEFAULT_CATALOG_URL: &str = "https://plus62store.github.io/products.json";
pub const DEFAULT_CATALOG_PATH: &str = "/produk.json";
pub const DEFAULT_CATALOG_CACHE_SECS: u64 = 300;
pub const DEFAULT_STORE_NAME: &str = "L Y Я A";
pub const DEFAULT_CHAT_STORE_NAMESPACE: &str = "chat_history";
pub const DEFAULT_QUOTA_STORE_NAMESPACE: &str = "credential_usage";
pub const DEFAULT_MAX_HISTORY_LENGTH: usize = 20;
pub const DEFAULT_DAILY_RATE_LIMIT: u32 = 50;
pub const DEFAULT_CREDENTIAL_DAILY_LIMIT: u32 = 10_000;

const CREDENTIAL_VAR: &str = "LLM_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CORS_ORIGIN is not a valid header value: {0}")]
    InvalidCorsOrigin(String),
    #[error("CATALOG_PATH must start with '/' and not shadow another route: {0}")]
    InvalidCatalogPath(String),
}

/// Fixed daily ceilings and history cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_history_length: usize,
    pub daily_rate_limit: u32,
    pub credential_daily_limit: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
            daily_rate_limit: DEFAULT_DAILY_RATE_LIMIT,
            credential_daily_limit: DEFAULT_CREDENTIAL_DAILY_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub chat_store_namespace: String,
    pub quota_store_namespace: String,
    pub credentials: Vec<Credential>,
    pub cors_origin: HeaderValue,
    pub catalog_url: String,
    pub catalog_path: String,
    pub catalog_cache_secs: u64,
    pub store_name: String,
    pub limits: Limits,
}

impl AppConfig {
    /// Build the service config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `CORS_ORIGIN` or `CATALOG_PATH` is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.into());
        let cors_origin =
            HeaderValue::from_str(&cors_origin).map_err(|_| ConfigError::InvalidCorsOrigin(cors_origin.clone()))?;

        let catalog_path = std::env::var("CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.into());
        if !valid_catalog_path(&catalog_path) {
            return Err(ConfigError::InvalidCatalogPath(catalog_path));
        }

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            chat_store_namespace: env_string("CHAT_STORE_NAMESPACE", DEFAULT_CHAT_STORE_NAMESPACE),
            quota_store_namespace: env_string("QUOTA_STORE_NAMESPACE", DEFAULT_QUOTA_STORE_NAMESPACE),
            credentials: credentials_from_vars(utf8_vars(std::env::vars_os())),
            cors_origin,
            catalog_url: env_string("CATALOG_URL", DEFAULT_CATALOG_URL),
            catalog_path,
            catalog_cache_secs: env_parse("CATALOG_CACHE_SECS", DEFAULT_CATALOG_CACHE_SECS),
            store_name: env_string("STORE_NAME", DEFAULT_STORE_NAME),
            limits: Limits {
                max_history_length: env_parse("MAX_HISTORY_LENGTH", DEFAULT_MAX_HISTORY_LENGTH),
                daily_rate_limit: env_parse("DAILY_RATE_LIMIT", DEFAULT_DAILY_RATE_LIMIT),
                credential_daily_limit: env_parse("CREDENTIAL_DAILY_LIMIT", DEFAULT_CREDENTIAL_DAILY_LIMIT),
            },
        })
    }
}

const RESERVED_PATHS: [&str; 3] = ["/", "/ai-assistant", "/chat-history"];

fn valid_catalog_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains(['{', '}', '*']) && !RESERVED_PATHS.contains(&path)
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_parse_opt<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Environment pairs that are valid UTF-8; anything else is skipped.
fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
}

/// Collect the ordered, deduplicated credential list from `(name, value)` pairs.
pub fn credentials_from_vars<I>(vars: I) -> Vec<Credential>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut default = None;
    let mut numbered: Vec<(u32, String)> = Vec::new();

    for (name, value) in vars {
        if name == CREDENTIAL_VAR {
            default = Some(value);
            continue;
        }
        let Some(index) = name
            .strip_prefix(CREDENTIAL_VAR)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        numbered.push((index, value));
    }
    numbered.sort_by_key(|(index, _)| *index);

    let mut out: Vec<Credential> = Vec::new();
    for raw in default.into_iter().chain(numbered.into_iter().map(|(_, v)| v)) {
        let trimmed = raw.trim();
        if trimmed.is_empty() || out.iter().any(|c| c.expose() == trimmed) {
            continue;
        }
        out.push(Credential::new(trimmed));
    }
    out
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
