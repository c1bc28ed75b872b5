//! Detection of alerts that already have a tracking issue.

use alerts::{IssueTracker, LookupKey, Owner, RepoName, TrackerError};
use tracing::debug;

/// Returns `true` if the tracker already holds an issue for `key`.
///
/// One search call, no mutation. Any hit counts.
pub async fn issue_exists(
    tracker: &dyn IssueTracker,
    owner: &Owner,
    repo: &RepoName,
    key: &LookupKey,
) -> Result<bool, TrackerError> {
    let hits = tracker.search_issues(owner, repo, key).await?;
    debug!(lookup_key = %key, hits = hits.len(), "Searched for existing tracking issue");
    Ok(!hits.is_empty())
}
