//! Fixed delays applied between and around collaborator calls.

use std::time::Duration;

/// Linear back-off applied when an alert's pipeline is rate limited.
///
/// After the `n`th rate-limited attempt the controller waits `step × n`,
/// as long as `n < max_attempts`. With the defaults that is 15 s, 30 s and
/// 45 s, for at most four attempts per alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    pub max_attempts: u32,
    pub step: Duration,
}

impl BackoffSchedule {
    /// Returns the delay to wait after `rate_limited` consecutive rate-limited
    /// attempts, or `None` once the attempt budget is spent.
    pub fn delay_after(&self, rate_limited: u32) -> Option<Duration> {
        (rate_limited > 0 && rate_limited < self.max_attempts).then(|| self.step * rate_limited)
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            step: Duration::from_secs(15),
        }
    }
}

/// All delays used by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Courtesy pause after every alert, whatever its outcome.
    pub inter_alert_delay: Duration,
    /// Wait between creating an issue and looking up its board item.
    pub settle_delay: Duration,
    pub backoff: BackoffSchedule,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            inter_alert_delay: Duration::from_secs(2),
            settle_delay: Duration::from_secs(5),
            backoff: BackoffSchedule::default(),
        }
    }
}
