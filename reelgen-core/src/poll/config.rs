//! Poll budget.

use std::time::Duration;

/// Attempt budget and fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Maximum number of status checks, counting the first (minimum 1).
    pub max_attempts: u32,
    /// Delay between consecutive status checks.
    pub interval: Duration,
}

impl PollConfig {
    /// Default attempt budget.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

    /// Default delay between attempts.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);

    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Override the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Override the delay between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Total time a poll spends sleeping when it runs out of attempts.
    ///
    /// There is no wait after the last attempt, so this is
    /// `(max_attempts - 1) * interval`. Status check latency is not included.
    pub fn ceiling(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts.max(1) - 1)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}
