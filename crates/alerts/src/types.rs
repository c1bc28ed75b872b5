//! Shared value types for the reconciliation domain.
//!
//! [`Alert`] is the raw record handed over by an
//! [`AlertSource`](crate::ports::AlertSource); it is never modified.
//! [`AlertDetails`] is the normalised, read-only view derived from it by
//! [`extract`](crate::details::extract).

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::AlertNumber;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity level of a vulnerability alert.
///
/// Parsed case-insensitively; serialised in lowercase, which is also the form
/// used as the key of the remediation SLA table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Returns the normalised (lowercase) name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Returns the capitalised name used in rendered issue text (e.g. `"High"`).
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// Error returned when a string is not a known [`Severity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}'")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str() == normalised)
            .ok_or(ParseSeverityError(normalised))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// A dependency-vulnerability alert as reported by the scanning source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert number, unique within the repository.
    pub number: AlertNumber,

    /// Severity exactly as reported (any casing).
    pub severity: String,

    /// Name of the vulnerable package.
    pub package_name: String,

    /// Package ecosystem (e.g. `"npm"`, `"rubygems"`, `"pip"`).
    pub ecosystem: String,

    /// Creation timestamp as reported. May be missing or unparsable.
    pub created_at: Option<String>,

    /// One-line advisory summary, when the source provides one.
    pub summary: Option<String>,

    /// GitHub Security Advisory identifier (e.g. `"GHSA-xxxx-xxxx-xxxx"`).
    pub ghsa_id: Option<String>,

    /// Link to the alert in the GitHub UI.
    pub html_url: Option<String>,
}

/// Normalised view of an [`Alert`] with its computed remediation deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDetails {
    pub number: AlertNumber,
    pub severity: Severity,
    pub package_name: String,
    pub ecosystem: String,

    /// Creation date. Today's date when the reported value was unparsable.
    pub created_at: NaiveDate,

    /// `created_at` plus the SLA days configured for `severity`.
    pub remediation_deadline: NaiveDate,

    pub summary: Option<String>,
    pub ghsa_id: Option<String>,
    pub html_url: Option<String>,
}
