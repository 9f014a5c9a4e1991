//! Credential rotation with per-credential daily quotas.
//!
//! DESIGN
//! ======
//! Upstream accounts are tried in configuration order; the first one still
//! under its daily limit wins (first-fit, not least-used), so the primary
//! key is preferred while it has headroom.
//!
//! Each credential has a usage record `{count, date}`. Rollover is lazy: a
//! record dated before today counts as zero and is rewritten as
//! `{count: 0, date: today}` the moment it is read.
//!
//! TRADE-OFFS
//! ==========
//! Selection and charging are separate calls. Usage is recorded only after
//! the upstream call succeeds, so failures never burn quota. Without a
//! compare-and-swap in the store, two concurrent requests can both read N
//! and both write N+1; the limits are soft ceilings so this is accepted.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::clock::{Clock, date_key};
use crate::store::{self, KvStore, StoreError};

const USAGE_KEY_PREFIX: &str = "usage:";
const FINGERPRINT_LEN: usize = 12;

// =============================================================================
// CREDENTIAL
// =============================================================================

/// Secret for one upstream account. `Debug`/`Display` print a fingerprint,
/// never the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    secret: String,
    digest: String,
}

impl Credential {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        let digest = sha256_hex(&secret);
        Self { secret, digest }
    }

    /// The raw secret, for building upstream request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.secret
    }

    /// Short stable identifier safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.digest[..FINGERPRINT_LEN]
    }

    fn usage_key(&self) -> String {
        format!("{USAGE_KEY_PREFIX}{}", self.digest)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.fingerprint()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fingerprint())
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// =============================================================================
// USAGE RECORD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub count: u32,
    pub date: String,
}

impl UsageRecord {
    fn fresh(date: String) -> Self {
        Self { count: 0, date }
    }
}

/// Usage that applies on `today`. `None` or a stale date both mean zero.
#[must_use]
pub fn effective_usage(record: Option<&UsageRecord>, today: &str) -> u32 {
    match record {
        Some(r) if r.date == today => r.count,
        _ => 0,
    }
}

// =============================================================================
// TRACKER
// =============================================================================

#[derive(Clone)]
pub struct QuotaTracker {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    daily_limit: u32,
}

impl QuotaTracker {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, daily_limit: u32) -> Self {
        Self { store, clock, daily_limit }
    }

    #[must_use]
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Return the first credential, in list order, whose usage today is
    /// below the daily limit. `None` when every credential is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if a usage record cannot be read or reset.
    pub async fn select_available_credential(
        &self,
        credentials: &[Credential],
    ) -> Result<Option<Credential>, StoreError> {
        let today = date_key(self.clock.now());

        for credential in credentials {
            let count = self.current_usage(credential, &today).await?;
            if count < self.daily_limit {
                debug!(credential = %credential, count, limit = self.daily_limit, "quota: credential selected");
                return Ok(Some(credential.clone()));
            }
            debug!(credential = %credential, count, limit = self.daily_limit, "quota: credential exhausted");
        }

        warn!(credentials = credentials.len(), limit = self.daily_limit, "quota: all credentials exhausted");
        Ok(None)
    }

    /// Charge one use against `credential` for today.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the record cannot be read or written.
    pub async fn record_usage(&self, credential: &Credential) -> Result<(), StoreError> {
        // Re-derive today: the upstream call may have straddled midnight.
        let today = date_key(self.clock.now());
        let key = credential.usage_key();
        let record: Option<UsageRecord> = store::get_json(self.store.as_ref(), &key).await?;

        let next = UsageRecord { count: effective_usage(record.as_ref(), &today).saturating_add(1), date: today };
        store::put_json(self.store.as_ref(), &key, &next, None).await?;

        info!(credential = %credential, count = next.count, limit = self.daily_limit, "quota: usage recorded");
        Ok(())
    }

    /// Read today's usage, persisting the reset when the stored record is
    /// missing or from an earlier day.
    async fn current_usage(&self, credential: &Credential, today: &str) -> Result<u32, StoreError> {
        let key = credential.usage_key();
        let record: Option<UsageRecord> = store::get_json(self.store.as_ref(), &key).await?;

        match record {
            Some(r) if r.date == today => Ok(r.count),
            stale => {
                if let Some(old) = &stale {
                    info!(credential = %credential, previous_date = %old.date, previous_count = old.count, "quota: daily reset");
                }
                store::put_json(self.store.as_ref(), &key, &UsageRecord::fresh(today.to_owned()), None).await?;
                Ok(0)
            }
        }
    }

    /// Stored record for `credential`, as-is. Used by tests and diagnostics.
    #[cfg(test)]
    pub async fn usage_record(&self, credential: &Credential) -> Result<Option<UsageRecord>, StoreError> {
        store::get_json(self.store.as_ref(), &credential.usage_key()).await
    }

    /// Overwrite the stored record for `credential`.
    #[cfg(test)]
    pub async fn seed_usage(&self, credential: &Credential, record: &UsageRecord) -> Result<(), StoreError> {
        store::put_json(self.store.as_ref(), &credential.usage_key(), record, None).await
    }
}

#[cfg(test)]
#[path = "quota_test.rs"]
mod tests;
