//! Bounded retry around one alert's pipeline.
//!
//! The whole pipeline is re-run from the start on every retry, not just the
//! step that was rate limited: a retry after a successful issue creation then
//! hits the deduplication check and stops there instead of creating a second
//! issue.

use std::future::Future;

use alerts::{AlertError, AlertNumber, RetryPolicy};
use tokio::time::sleep;
use tracing::{error, warn};

use crate::BackoffSchedule;

/// Final result of running an alert's pipeline under the retry controller.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    /// The pipeline succeeded.
    Completed(T),
    /// The pipeline failed with a non-retryable error. It ran once.
    Failed(AlertError),
    /// Every attempt was rate limited.
    Exhausted { attempts: u32, last: AlertError },
}

/// Runs `pipeline` until it succeeds, fails with a non-retryable error, or
/// has been rate limited `schedule.max_attempts` times.
///
/// `pipeline` receives the 1-based attempt number. The rate-limit counter is
/// local to this call.
pub async fn run_with_backoff<T, F, Fut>(
    alert: AlertNumber,
    schedule: &BackoffSchedule,
    mut pipeline: F,
) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AlertError>>,
{
    let mut rate_limited: u32 = 0;

    loop {
        let attempt = rate_limited + 1;
        let error = match pipeline(attempt).await {
            Ok(value) => return RetryOutcome::Completed(value),
            Err(error) => error,
        };

        match error.retry_policy() {
            RetryPolicy::Retryable { after } => {
                rate_limited += 1;
                match schedule.delay_after(rate_limited) {
                    Some(delay) => {
                        warn!(
                            alert_number = %alert,
                            attempt,
                            delay_secs = delay.as_secs(),
                            server_hint_secs = after.map(|d| d.as_secs()),
                            "Rate limited; retrying alert from the start"
                        );
                        sleep(delay).await;
                    }
                    None => {
                        error!(
                            alert_number = %alert,
                            attempts = rate_limited,
                            "Rate limit retries exhausted; abandoning alert"
                        );
                        return RetryOutcome::Exhausted {
                            attempts: rate_limited,
                            last: error,
                        };
                    }
                }
            }
            RetryPolicy::NonRetryable => {
                error!(alert_number = %alert, error = %error, "Failed to reconcile alert; skipping");
                return RetryOutcome::Failed(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use alerts::TrackerError;
    use tokio::time::Instant;

    use super::*;

    fn limited() -> AlertError {
        AlertError::Tracker(TrackerError::RateLimited { after: None })
    }

    #[tokio::test(start_paused = true)]
    async fn always_rate_limited_makes_four_attempts() {
        let calls = Cell::new(0u32);
        let started = Instant::now();

        let outcome: RetryOutcome<()> =
            run_with_backoff(AlertNumber::new(1), &BackoffSchedule::default(), |_| {
                calls.set(calls.get() + 1);
                async { Err(limited()) }
            })
            .await;

        assert_eq!(calls.get(), 4);
        assert_eq!(
            outcome,
            RetryOutcome::Exhausted {
                attempts: 4,
                last: limited()
            }
        );
        assert_eq!(started.elapsed(), Duration::from_secs(15 + 30 + 45));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_rate_limit() {
        let started = Instant::now();

        let outcome = run_with_backoff(AlertNumber::new(2), &BackoffSchedule::default(), |attempt| async move {
            if attempt < 3 {
                Err(limited())
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(outcome, RetryOutcome::Completed(3));
        assert_eq!(started.elapsed(), Duration::from_secs(15 + 30));
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_are_not_retried() {
        let calls = Cell::new(0u32);
        let started = Instant::now();

        let outcome: RetryOutcome<()> =
            run_with_backoff(AlertNumber::new(3), &BackoffSchedule::default(), |_| {
                calls.set(calls.get() + 1);
                async {
                    Err(AlertError::Tracker(TrackerError::Api {
                        status: 502,
                        message: "bad gateway".into(),
                    }))
                }
            })
            .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(outcome, RetryOutcome::Failed(AlertError::Tracker(TrackerError::Api { status: 502, .. }))));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
