//! Time source for day-boundary logic.
//!
//! DESIGN
//! ======
//! Quota and rate counters reset lazily when the calendar date changes, so
//! "what day is it" must be injectable. Everything that reads the wall clock
//! goes through `Clock`; tests drive a `ManualClock` across midnight.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Days, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Ok(delta) = chrono::Duration::from_std(by) {
            *now += delta;
        }
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// =============================================================================
// DAY BOUNDARIES
// =============================================================================

/// Calendar date key (`YYYY-MM-DD`, UTC) used by the daily counters.
#[must_use]
pub fn date_key(now: DateTime<Utc>) -> String {
    now.date_naive().format("%Y-%m-%d").to_string()
}

/// Time remaining until the next UTC midnight. At exactly midnight the
/// full day is returned.
#[must_use]
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let Some(tomorrow) = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return Duration::ZERO;
    };
    (tomorrow.and_utc() - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
#[path = "clock_test.rs"]
mod tests;
