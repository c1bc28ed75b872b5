//! Alert normalisation and remediation-deadline computation.

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::warn;

use crate::{Alert, AlertDetails, AlertError, RemediationSla, Severity};

/// Normalises `alert` and computes its remediation deadline, using today's
/// date (UTC) when the alert's creation timestamp cannot be parsed.
pub fn extract(alert: &Alert, sla: &RemediationSla) -> Result<AlertDetails, AlertError> {
    extract_on(alert, sla, Utc::now().date_naive())
}

/// Same as [`extract`], with an explicit fallback date.
///
/// The fallback is surfaced as a warning so the upstream data problem stays
/// visible in the run log.
pub fn extract_on(
    alert: &Alert,
    sla: &RemediationSla,
    today: NaiveDate,
) -> Result<AlertDetails, AlertError> {
    let unknown = || AlertError::UnknownSeverity {
        alert: alert.number,
        severity: alert.severity.trim().to_ascii_lowercase(),
    };

    let severity: Severity = alert.severity.parse().map_err(|_| unknown())?;
    let days = sla.days_for(severity).ok_or_else(unknown)?;

    let created_at = match alert.created_at.as_deref().and_then(parse_date) {
        Some(date) => date,
        None => {
            warn!(
                alert_number = %alert.number,
                raw_created_at = alert.created_at.as_deref().unwrap_or("<missing>"),
                fallback = %today,
                "Alert creation date is unparsable; computing deadline from today"
            );
            today
        }
    };

    let remediation_deadline = created_at
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or(AlertError::DeadlineOutOfRange {
            alert: alert.number,
            created_at,
            days,
        })?;

    Ok(AlertDetails {
        number: alert.number,
        severity,
        package_name: alert.package_name.clone(),
        ecosystem: alert.ecosystem.clone(),
        created_at,
        remediation_deadline,
        summary: alert.summary.clone(),
        ghsa_id: alert.ghsa_id.clone(),
        html_url: alert.html_url.clone(),
    })
}

/// Accepts an RFC 3339 timestamp (as GitHub reports) or a bare `YYYY-MM-DD`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
