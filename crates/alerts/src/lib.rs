//! Reconciliation domain for Dependaboat.
//!
//! This crate contains every domain concept, newtype identifier, value type and
//! error type used to turn vulnerability alerts into tracking issues and board
//! entries, plus the port traits the engine consumes. Infrastructure crates
//! implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`AlertNumber`, `IssueNumber`, `ProjectId`, etc.) |
//! | [`types`] | `Severity`, `Alert`, `AlertDetails` |
//! | [`board`] | `Project`, `ProjectField`, `ProjectItem` |
//! | [`issue`] | `Issue`, `IssueSummary`, `LookupKey` |
//! | [`errors`] | Error taxonomy and `RetryPolicy` |
//! | [`config`] | Configuration schema and validation |
//! | [`template`] | `TemplateContext` and `render` |
//! | [`assignees`] | Ecosystem-based assignee resolution |
//! | [`details`] | Alert normalisation and deadline computation |
//! | [`ports`] | Collaborator traits |

pub mod assignees;
pub mod board;
pub mod config;
pub mod details;
pub mod errors;
pub mod identifiers;
pub mod issue;
pub mod ports;
pub mod template;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use assignees::{AssigneeList, AssigneeTable};
pub use board::{Project, ProjectField, ProjectFieldKind, ProjectItem, SelectOption};
pub use config::{Config, ConfigError, FieldMapping, GithubSettings, IssueTemplates, RemediationSla};
pub use details::{extract, extract_on};
pub use errors::{AlertError, ReconcileError, RetryPolicy, TrackerError};
pub use identifiers::{AlertNumber, IssueNumber, Owner, ProjectId, ProjectItemId, RepoName, RunId};
pub use issue::{Issue, IssueSummary, LookupKey};
pub use ports::{AlertSource, IssueTracker, ProjectBoard};
pub use template::{render, TemplateContext};
pub use types::{Alert, AlertDetails, ParseSeverityError, Severity};
