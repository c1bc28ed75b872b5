//! Issue search and creation over the REST API.

use alerts::{
    Issue, IssueNumber, IssueSummary, IssueTracker, LookupKey, Owner, RepoName, TrackerError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::GithubClient;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<IssuePayload>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    title: String,
}

#[derive(Debug, Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
    assignees: &'a [String],
}

/// Searches and creates issues. Authenticated with the Octokit token.
#[derive(Debug, Clone)]
pub struct GithubIssueTracker {
    client: GithubClient,
}

impl GithubIssueTracker {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IssueTracker for GithubIssueTracker {
    /// Searches issue titles for `key` as an exact phrase.
    ///
    /// GitHub's search tokenises punctuation away, so `[repo/DB 3]` also
    /// matches `[repo/DB 3 4]`-like titles; hits the key does not match
    /// verbatim are dropped.
    #[instrument(skip_all, fields(owner = %owner, repo = %repo, lookup_key = %key))]
    async fn search_issues(
        &self,
        owner: &Owner,
        repo: &RepoName,
        key: &LookupKey,
    ) -> Result<Vec<IssueSummary>, TrackerError> {
        let q = format!(
            "repo:{owner}/{repo} is:issue in:title \"{}\"",
            key.as_str().replace('"', "")
        );
        let request = self
            .client
            .get(&self.client.url("/search/issues"))
            .query(&[("q", q.as_str()), ("per_page", "100")]);

        let response: SearchResponse = self.client.send(request).await?.value;
        let total = response.items.len();

        let hits: Vec<IssueSummary> = response
            .items
            .into_iter()
            .filter(|item| key.matches_title(&item.title))
            .map(|item| IssueSummary {
                number: IssueNumber::new(item.number),
                title: item.title,
            })
            .collect();

        debug!(total, exact = hits.len(), "Issue search complete");
        Ok(hits)
    }

    #[instrument(skip_all, fields(owner = %issue.owner, repo = %issue.repo, title = %issue.title))]
    async fn create_issue(&self, issue: &Issue) -> Result<IssueNumber, TrackerError> {
        let request = self
            .client
            .post(&self.client.url(&format!("/repos/{}/{}/issues", issue.owner, issue.repo)))
            .json(&CreateIssueRequest {
                title: &issue.title,
                body: &issue.body,
                labels: &issue.labels,
                assignees: &issue.assignees,
            });

        let created: IssuePayload = self.client.send(request).await?.value;
        Ok(IssueNumber::new(created.number))
    }
}
