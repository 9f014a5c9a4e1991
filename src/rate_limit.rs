//! Daily per-user rate limiting for chat requests.
//!
//! DESIGN
//! ======
//! One counter per `(user_id, date)` stored under
//! `rate_limit:{user_id}:{YYYY-MM-DD}`. Each admitted request rewrites the
//! counter with a TTL that ends at the next UTC midnight, so old days clean
//! themselves up and a new day starts from an absent key.
//!
//! TRADE-OFFS
//! ==========
//! The user is charged when admitted, whether or not the upstream call later
//! succeeds: this protects request volume, not upstream cost. Check and
//! increment are one call so callers cannot forget to charge, but they are
//! not atomic against concurrent requests for the same user.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::{Clock, date_key, until_next_midnight};
use crate::store::{KvStore, StoreError};

const KEY_PREFIX: &str = "rate_limit";

#[must_use]
pub fn rate_limit_key(user_id: &str, date: &str) -> String {
    format!("{KEY_PREFIX}:{user_id}:{date}")
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    daily_limit: u32,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, daily_limit: u32) -> Self {
        Self { store, clock, daily_limit }
    }

    #[must_use]
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Admit and charge one request for `user_id`, or reject it.
    ///
    /// Returns `false` without writing anything once today's count has
    /// reached the limit.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the counter cannot be read or written.
    pub async fn check_and_consume(&self, user_id: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let key = rate_limit_key(user_id, &date_key(now));

        let count = match self.store.get(&key).await? {
            Some(raw) => parse_count(&raw, &key),
            None => 0,
        };

        if count >= self.daily_limit {
            warn!(%user_id, count, limit = self.daily_limit, "rate limit: rejected");
            return Ok(false);
        }

        let next = count.saturating_add(1);
        self.store
            .put(&key, &next.to_string(), Some(until_next_midnight(now)))
            .await?;
        debug!(%user_id, count = next, limit = self.daily_limit, "rate limit: admitted");
        Ok(true)
    }
}

/// A corrupt counter reads as zero rather than locking the user out.
fn parse_count(raw: &str, key: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or_else(|_| {
        warn!(%key, value = %raw, "rate limit: unreadable counter, treating as 0");
        0
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
