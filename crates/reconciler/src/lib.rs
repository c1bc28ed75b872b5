//! Dependaboat reconciliation engine.
//!
//! Turns each unresolved alert into exactly one tracking issue and keeps the
//! issue's project board item in step with the alert's computed values.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The engine sequences calls between the business
//! logic in the [`alerts`] crate and the collaborator ports ([`alerts::AlertSource`],
//! [`alerts::IssueTracker`], [`alerts::ProjectBoard`]). It contains no
//! GitHub-specific code.
//!
//! ## Concurrency
//!
//! Strictly sequential: each alert, including its retries, is fully resolved
//! before the next one starts. Nothing is spawned.
//!
//! ## Per-alert pipeline
//!
//! 1. Deduplicate by [`alerts::LookupKey`] ([`dedup`]).
//! 2. Extract details and the remediation deadline.
//! 3. Render templates and build the issue.
//! 4. Persist (skipped in dry-run mode).
//! 5. Synchronise the board item ([`sync`]).
//!
//! The whole pipeline runs under [`retry::run_with_backoff`].

pub mod dedup;
pub mod engine;
pub mod pacing;
pub mod retry;
pub mod sync;

pub use engine::{AlertOutcome, Reconciler, RunSummary};
pub use pacing::{BackoffSchedule, Pacing};
pub use retry::{run_with_backoff, RetryOutcome};
pub use sync::ProjectItemSynchronizer;
