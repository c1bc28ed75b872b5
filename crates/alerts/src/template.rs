//! `{{variable}}` templating for issue titles, bodies, labels and project
//! field values.
//!
//! Rendering is a single left-to-right pass: substituted values are never
//! re-scanned, so a value that itself contains `{{...}}` is emitted verbatim.
//! No escaping of any kind is applied.

use crate::AlertDetails;

/// Variables available to every template rendered for one alert.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    vars: Vec<(String, String)>,
}

impl TemplateContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, replacing the value of an existing one in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.vars.push((key, value)),
        }
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Builds the standard context for an alert.
    ///
    /// Dates are rendered as `YYYY-MM-DD`; optional advisory data renders as
    /// an empty string when the source did not provide it.
    pub fn for_alert(details: &AlertDetails) -> Self {
        Self::new()
            .with("alert_number", details.number)
            .with("alert_severity", details.severity.display_name())
            .with("alert_package_name", &details.package_name)
            .with("alert_package_ecosystem", &details.ecosystem)
            .with("alert_created_at", details.created_at.format("%Y-%m-%d"))
            .with(
                "remediation_deadline",
                details.remediation_deadline.format("%Y-%m-%d"),
            )
            .with("alert_summary", details.summary.as_deref().unwrap_or_default())
            .with("alert_ghsa_id", details.ghsa_id.as_deref().unwrap_or_default())
            .with("alert_url", details.html_url.as_deref().unwrap_or_default())
    }
}

/// Renders `template`, replacing every `{{key}}` whose key is present in
/// `context`. Unknown tokens are left untouched.
pub fn render(template: &str, context: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let matched = after_open
            .find("}}")
            .and_then(|end| context.get(&after_open[..end]).map(|value| (end, value)));

        match matched {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after_open[end + 2..];
            }
            None => {
                // Emit one brace and rescan, so `{{{{key}}` still resolves the
                // inner token.
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}
