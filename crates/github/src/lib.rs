//! Dependaboat GitHub infrastructure adapter.
//!
//! Implements the port traits defined in the [`alerts`] crate against the
//! GitHub REST and GraphQL APIs using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (rate limiting, pagination, authentication, GraphQL
//! envelopes) are handled here; the [`alerts`] and `reconciler` crates never
//! see them. Every failure surfaces as an [`alerts::TrackerError`], with rate
//! limits mapped to [`alerts::TrackerError::RateLimited`].
//!
//! ## Adapters
//!
//! | Type | Port | API |
//! |------|------|-----|
//! | [`GithubAlertSource`] | `AlertSource` | REST `dependabot/alerts` |
//! | [`GithubIssueTracker`] | `IssueTracker` | REST `search/issues`, `issues` |
//! | [`GithubProjectBoard`] | `ProjectBoard` | GraphQL ProjectV2 |
//!
//! Each adapter owns its own [`GithubClient`], so each API family can be
//! authenticated with a different token.

mod client;
mod dependabot;
mod issues;
mod projects;

pub use client::{ClientError, GithubClient, DEFAULT_API_URL};
pub use dependabot::GithubAlertSource;
pub use issues::GithubIssueTracker;
pub use projects::GithubProjectBoard;
