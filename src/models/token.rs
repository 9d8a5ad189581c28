//! Bearer token issued by the identity service.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds shaved off `expires_in` so a token is never presented right at expiry.
pub const EXPIRY_BUFFER_SECS: i64 = 30;

/// Longest lifetime accepted from the identity service (one year).
pub const MAX_EXPIRES_IN_SECS: i64 = 366 * 24 * 60 * 60;

#[derive(Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    /// Lifetime in seconds, as reported by the identity service.
    pub expires_in: i64,
    pub fetched_at: DateTime<Utc>,
}

impl TokenInfo {
    /// Valid iff `now - fetched_at < expires_in - 30s`.
    /// A lifetime that cannot be represented counts as already expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self.validity_window() {
            Some(window) => now.signed_duration_since(self.fetched_at) < window,
            None => false,
        }
    }

    /// Whole seconds left before the token stops being valid, floored at 0.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        self.validity_window()
            .and_then(|window| self.fetched_at.checked_add_signed(window))
            .map(|deadline| deadline.signed_duration_since(now).num_seconds().max(0))
            .unwrap_or(0)
    }

    fn validity_window(&self) -> Option<Duration> {
        self.expires_in
            .checked_sub(EXPIRY_BUFFER_SECS)
            .and_then(Duration::try_seconds)
    }
}

// Keep the bearer out of logs.
impl std::fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"****")
            .field("expires_in", &self.expires_in)
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}
