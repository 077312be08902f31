//! Autosave throttle.
//!
//! Each biography is either *Ready* or *Throttled*, derived purely from its
//! persisted `autosave_at` timestamp and the current time. A throttled request
//! performs no write and leaves the timestamp untouched, so a burst collapses
//! to one accepted write per interval rather than to zero.
//!
//! There is no cross-request lock. Two concurrent autosaves may both observe
//! *Ready*; the last write to `autosave_at` wins.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default minimum spacing between accepted autosaves.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 2_000;

/// Outcome of evaluating the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Ready,
    Throttled {
        last_autosave_at: DateTime<Utc>,
        retry_after_ms: u64,
    },
}

/// Stateless throttle policy.
#[derive(Debug, Clone, Copy)]
pub struct AutosaveThrottle {
    min_interval_ms: u64,
}

impl Default for AutosaveThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL_MS)
    }
}

impl AutosaveThrottle {
    pub fn new(min_interval_ms: u64) -> Self {
        Self { min_interval_ms }
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// Decides whether an autosave issued at `now` may write.
    ///
    /// A timestamp in the future (clock skew between writers) is treated as
    /// "just saved".
    pub fn evaluate(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> AutosaveState {
        let Some(last) = last else {
            return AutosaveState::Ready;
        };

        let elapsed_ms = (now - last).num_milliseconds().max(0) as u64;
        if elapsed_ms < self.min_interval_ms {
            AutosaveState::Throttled {
                last_autosave_at: last,
                retry_after_ms: self.min_interval_ms - elapsed_ms,
            }
        } else {
            AutosaveState::Ready
        }
    }
}

/// Response body of an autosave request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutosaveOutcome {
    pub autosave_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub throttled: bool,
}
