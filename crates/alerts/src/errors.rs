//! Error and retry-policy types for the reconciliation domain.
//!
//! The taxonomy has three tiers:
//!
//! - [`TrackerError`]: a failure reported by a collaborator (alert source,
//!   issue tracker, project board). Each one knows its own [`RetryPolicy`].
//! - [`AlertError`]: anything that stops one alert from being reconciled.
//!   Never aborts the run.
//! - [`ReconcileError`]: a fatal startup failure that aborts the whole run.
//!
//! Configuration problems are reported separately as
//! [`ConfigError`](crate::config::ConfigError) because they are raised before
//! any collaborator exists.

use std::time::Duration;

use chrono::NaiveDate;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AlertNumber, ProjectId};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by collaborator error types to let the retry controller decide
/// whether to re-run an alert's pipeline.
///
/// ## Rules
///
/// - `Retryable` errors: rate-limit responses only.
/// - `NonRetryable` errors: everything else. The alert is logged and skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally carries the server's hint (derived from
    /// `Retry-After` or `x-ratelimit-reset` response headers).
    Retryable {
        /// Server-suggested minimum back-off. `None` means apply the caller's
        /// own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// A failure reported by one of the collaborator ports
/// ([`AlertSource`](crate::ports::AlertSource),
/// [`IssueTracker`](crate::ports::IssueTracker),
/// [`ProjectBoard`](crate::ports::ProjectBoard)).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackerError {
    /// The remote API signalled a primary or secondary rate limit.
    #[error("Rate limit exceeded{}", retry_hint(.after))]
    RateLimited {
        /// Server-suggested delay before the next request, when known.
        after: Option<Duration>,
    },

    /// The requested entity does not exist (or is not visible to the token).
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// The remote API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A GraphQL response carried one or more errors.
    #[error("GraphQL errors: {messages}")]
    GraphQl {
        /// The error messages, joined with `", "`.
        messages: String,
    },

    /// The board has no field with the configured name.
    #[error("Project has no field named '{field}'")]
    UnknownField {
        /// Configured field name.
        field: String,
    },

    /// A rendered value cannot be stored in the target field.
    #[error("Value '{value}' is not valid for field '{field}': {reason}")]
    InvalidFieldValue {
        /// Field name.
        field: String,
        /// Rendered value.
        value: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("Transport error: {message}")]
    Transport {
        /// Underlying error rendered as text.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Underlying error rendered as text.
        message: String,
    },
}

fn retry_hint(after: &Option<Duration>) -> String {
    match after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}

impl TrackerError {
    /// Returns the retry policy for this error.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::RateLimited { after } => RetryPolicy::Retryable { after: *after },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-alert errors
// ---------------------------------------------------------------------------

/// Anything that prevents a single alert from being reconciled.
///
/// Logged with the alert number; the run always continues with the next alert.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AlertError {
    /// No remediation SLA is configured for the alert's severity.
    #[error("Alert #{alert}: no remediation SLA configured for severity '{severity}'")]
    UnknownSeverity {
        /// The offending alert.
        alert: AlertNumber,
        /// The normalised (lowercase) severity.
        severity: String,
    },

    /// Creation date plus SLA days falls outside the representable calendar.
    #[error("Alert #{alert}: remediation deadline {created_at} + {days} days is out of range")]
    DeadlineOutOfRange {
        alert: AlertNumber,
        created_at: NaiveDate,
        days: u32,
    },

    /// A collaborator call failed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl AlertError {
    /// Returns the retry policy for this error.
    ///
    /// Only a rate-limited collaborator call is retryable.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::UnknownSeverity { .. } | Self::DeadlineOutOfRange { .. } => {
                RetryPolicy::NonRetryable
            }
            Self::Tracker(e) => e.retry_policy(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that abort the reconciliation run before any alert is processed.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The configured project could not be resolved.
    #[error("Could not resolve project '{project_id}': {source}")]
    ProjectUnresolvable {
        /// The configured project id.
        project_id: ProjectId,
        /// The collaborator failure.
        #[source]
        source: TrackerError,
    },

    /// The alert list for the configured repository could not be fetched.
    #[error("Could not fetch alerts for {owner}/{repo}: {source}")]
    AlertsUnavailable {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
        /// The collaborator failure.
        #[source]
        source: TrackerError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limits_are_retryable() {
        let limited = AlertError::from(TrackerError::RateLimited {
            after: Some(Duration::from_secs(7)),
        });
        assert_eq!(
            limited.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(7))
            }
        );

        let api = AlertError::from(TrackerError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(api.retry_policy(), RetryPolicy::NonRetryable);

        let severity = AlertError::UnknownSeverity {
            alert: AlertNumber::new(1),
            severity: "moderate".into(),
        };
        assert_eq!(severity.retry_policy(), RetryPolicy::NonRetryable);
    }

    #[test]
    fn rate_limit_message_includes_hint_when_present() {
        let with_hint = TrackerError::RateLimited {
            after: Some(Duration::from_secs(30)),
        };
        assert_eq!(with_hint.to_string(), "Rate limit exceeded (retry after 30s)");

        let without = TrackerError::RateLimited { after: None };
        assert_eq!(without.to_string(), "Rate limit exceeded");
    }
}
