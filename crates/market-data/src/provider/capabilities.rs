//! Rate limiting configuration for a provider.

use std::time::Duration;

/// Rate limiting configuration for a provider.
///
/// Controls how aggressively we can call a provider to avoid
/// hitting their rate limits and getting blocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Minimum delay between requests.
    pub min_delay: Duration,
}

impl RateLimit {
    /// Evenly spaced requests: `60s / requests_per_minute` apart.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let min_delay = if requests_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(60) / requests_per_minute
        };
        Self {
            requests_per_minute,
            min_delay,
        }
    }

    /// No pacing at all.
    pub fn unlimited() -> Self {
        Self {
            requests_per_minute: 0,
            min_delay: Duration::ZERO,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_minute(60)
    }
}
