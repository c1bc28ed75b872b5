//! Tracking issues and the lookup key that makes their creation idempotent.

use serde::{Deserialize, Serialize};

use crate::{AlertNumber, IssueNumber, Owner, RepoName};

/// Deterministic marker identifying the tracking issue of one alert.
///
/// Rendered as `[<repo>/DB <number>]`. The same string is used as the
/// deduplication search query and as the prefix of the issue title, so a
/// re-run against the same tracker state finds every issue it created before.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn new(repo: &RepoName, alert: AlertNumber) -> Self {
        Self(format!("[{repo}/DB {alert}]"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `title` carries this key.
    pub fn matches_title(&self, title: &str) -> bool {
        title.contains(self.0.as_str())
    }

    /// Prefixes a rendered title with the key.
    pub fn title_with(&self, rendered_title: &str) -> String {
        format!("{} {}", self.0, rendered_title)
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A search hit returned by an [`IssueTracker`](crate::ports::IssueTracker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub number: IssueNumber,
    pub title: String,
}

/// A tracking issue, either about to be created or already persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub owner: Owner,
    pub repo: RepoName,
    pub title: String,
    pub body: String,
    /// Ordered, duplicate-free.
    pub labels: Vec<String>,
    /// Ordered, duplicate-free.
    pub assignees: Vec<String>,
    /// `None` until the tracker has persisted the issue.
    pub number: Option<IssueNumber>,
}

impl Issue {
    /// Builds an unpersisted issue. Performs no I/O.
    ///
    /// Labels and assignees keep their first-seen order; duplicates and
    /// blank entries are dropped.
    pub fn build(
        owner: Owner,
        repo: RepoName,
        title: impl Into<String>,
        body: impl Into<String>,
        labels: impl IntoIterator<Item = String>,
        assignees: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            owner,
            repo,
            title: title.into(),
            body: body.into(),
            labels: ordered_set(labels),
            assignees: ordered_set(assignees),
            number: None,
        }
    }

    /// Marks the issue as persisted under `number`.
    #[must_use]
    pub fn persisted(mut self, number: IssueNumber) -> Self {
        self.number = Some(number);
        self
    }
}

fn ordered_set(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let trimmed = item.trim();
        if !trimmed.is_empty() && !out.iter().any(|seen| seen == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}
