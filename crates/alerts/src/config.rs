//! Run configuration: schema, parsing and validation.
//!
//! The YAML document is first deserialised into permissive `Raw*` structs and
//! then validated into [`Config`]. Every required value is checked here, so
//! the reconciliation loop never discovers a configuration gap mid-run.
//!
//! ```yaml
//! github:
//!   project_id: PVT_kwDOALH_aM4Ac-_z
//!   owner: acme
//!   repo: webapp
//!   issue:
//!     title: "{{alert_severity}}: {{alert_package_name}}"
//!     body: "Fix by {{remediation_deadline}}"
//!     labels: [security, "{{alert_package_ecosystem}}"]
//!     assignees:
//!       npm: [frontend-oncall]
//!       other: [security-oncall]
//!       all: [security-lead]
//!   project_item:
//!     field_map:
//!       - field_name: Due
//!         field_value: "{{remediation_deadline}}"
//! remediation_sla:
//!   critical: 1
//!   high: 3
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AssigneeTable, Owner, ProjectId, RepoName, Severity};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The configuration could not be loaded or is invalid. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Could not read config file '{path}': {message}")]
    Unreadable { path: String, message: String },

    /// The document is not valid YAML or has the wrong shape.
    #[error("Malformed config: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// A required value is absent or empty.
    #[error("Missing required config value '{0}'")]
    Missing(&'static str),

    /// A value is present but not acceptable.
    #[error("Invalid config value '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Longest accepted remediation SLA (100 years).
pub const MAX_SLA_DAYS: u32 = 36_500;

/// Days allowed to remediate an alert, per severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemediationSla(BTreeMap<Severity, u32>);

impl RemediationSla {
    pub fn new(days: BTreeMap<Severity, u32>) -> Self {
        Self(days)
    }

    /// Returns the SLA in days for `severity`, if configured.
    pub fn days_for(&self, severity: Severity) -> Option<u32> {
        self.0.get(&severity).copied()
    }
}

/// One entry of the project-item field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    /// Name of the board field to set.
    pub field_name: String,
    /// Template rendered against the alert's context.
    pub field_value: String,
}

/// Templates for the tracking issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueTemplates {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: AssigneeTable,
}

/// Repository and board settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GithubSettings {
    pub project_id: ProjectId,
    pub owner: Owner,
    pub repo: RepoName,
    pub issue: IssueTemplates,
    /// Applied in declaration order.
    pub field_map: Vec<FieldMapping>,
}

/// Validated run configuration. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub github: GithubSettings,
    pub remediation_sla: RemediationSla,
}

impl Config {
    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(document)?;
        raw.validate()
    }
}

// ---------------------------------------------------------------------------
// Raw (unvalidated) document
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    github: RawGithub,
    remediation_sla: BTreeMap<String, i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGithub {
    project_id: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    issue: RawIssue,
    project_item: RawProjectItem,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIssue {
    title: Option<String>,
    body: Option<String>,
    labels: Option<Vec<String>>,
    assignees: Option<AssigneeTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProjectItem {
    field_map: Option<Vec<RawFieldMapping>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFieldMapping {
    field_name: Option<String>,
    field_value: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(field))
}

impl RawConfig {
    fn validate(self) -> Result<Config, ConfigError> {
        let github = self.github;

        let project_id = ProjectId::new(required(github.project_id, "github.project_id")?)
            .ok_or(ConfigError::Missing("github.project_id"))?;
        let owner = Owner::new(required(github.owner, "github.owner")?)
            .ok_or(ConfigError::Missing("github.owner"))?;
        let repo = RepoName::new(required(github.repo, "github.repo")?)
            .ok_or(ConfigError::Missing("github.repo"))?;

        let issue = IssueTemplates {
            title: required(github.issue.title, "github.issue.title")?,
            body: github
                .issue
                .body
                .ok_or(ConfigError::Missing("github.issue.body"))?,
            labels: github.issue.labels.unwrap_or_default(),
            assignees: github.issue.assignees.unwrap_or_default(),
        };

        let field_map = github
            .project_item
            .field_map
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let field_name = raw.field_name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
                    ConfigError::Invalid {
                        field: format!("github.project_item.field_map[{index}].field_name"),
                        reason: "must be a non-empty string".into(),
                    }
                })?;
                let field_value = raw.field_value.ok_or_else(|| ConfigError::Invalid {
                    field: format!("github.project_item.field_map[{index}].field_value"),
                    reason: "is required".into(),
                })?;
                Ok(FieldMapping {
                    field_name,
                    field_value,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        if self.remediation_sla.is_empty() {
            return Err(ConfigError::Missing("remediation_sla"));
        }

        // Keys must name one of Dependabot's four severities; an unknown key is
        // rejected here rather than surfacing later as per-alert UnknownSeverity.
        let mut sla = BTreeMap::new();
        for (key, days) in self.remediation_sla {
            let field = format!("remediation_sla.{key}");
            let severity: Severity = key.parse().map_err(|e| ConfigError::Invalid {
                field: field.clone(),
                reason: format!("{e}"),
            })?;
            let days = u32::try_from(days)
                .ok()
                .filter(|d| *d <= MAX_SLA_DAYS)
                .ok_or_else(|| ConfigError::Invalid {
                    field,
                    reason: format!("{days} is not a number of days between 0 and {MAX_SLA_DAYS}"),
                })?;
            sla.insert(severity, days);
        }

        Ok(Config {
            github: GithubSettings {
                project_id,
                owner,
                repo,
                issue,
                field_map,
            },
            remediation_sla: RemediationSla::new(sla),
        })
    }
}
