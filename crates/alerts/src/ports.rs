//! Collaborator port traits.
//!
//! The reconciliation engine only ever talks to the outside world through
//! these traits. The `github` crate implements them over the GitHub REST and
//! GraphQL APIs; tests implement them in memory.
//!
//! Every method may fail with [`TrackerError::RateLimited`], which the retry
//! controller treats as the only retryable condition.

use async_trait::async_trait;

use crate::{
    Alert, Issue, IssueNumber, IssueSummary, LookupKey, Owner, Project, ProjectId, ProjectItem,
    RepoName, TrackerError,
};

/// Source of unresolved vulnerability alerts.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Returns every open alert for the repository, in source order.
    async fn get_alerts(&self, owner: &Owner, repo: &RepoName) -> Result<Vec<Alert>, TrackerError>;
}

/// Issue tracker holding the tracking issues.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Returns the repository's issues whose title carries `key`
    /// (see [`LookupKey::matches_title`]).
    async fn search_issues(
        &self,
        owner: &Owner,
        repo: &RepoName,
        key: &LookupKey,
    ) -> Result<Vec<IssueSummary>, TrackerError>;

    /// Persists `issue` and returns the number the tracker assigned.
    async fn create_issue(&self, issue: &Issue) -> Result<IssueNumber, TrackerError>;
}

/// Project board on which automation mirrors new issues.
#[async_trait]
pub trait ProjectBoard: Send + Sync {
    /// Loads the board's metadata. Called once per run.
    async fn resolve_project(&self, project_id: &ProjectId) -> Result<Project, TrackerError>;

    /// Finds the board item linked to issue `number`.
    ///
    /// Returns [`TrackerError::NotFound`] when the automation has not created
    /// the item (yet).
    async fn find_item_by_issue_number(
        &self,
        project: &Project,
        owner: &Owner,
        repo: &RepoName,
        number: IssueNumber,
    ) -> Result<ProjectItem, TrackerError>;

    /// Sets one field of `item` to `value`.
    async fn update_item_field(
        &self,
        project: &Project,
        item: &ProjectItem,
        field_name: &str,
        value: &str,
    ) -> Result<(), TrackerError>;
}
