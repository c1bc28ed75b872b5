//! Second phase of reconciliation: copying computed values onto the board
//! item that automation creates for a new issue.

use std::time::Duration;

use alerts::{
    render, FieldMapping, IssueNumber, Owner, Project, ProjectBoard, ProjectItem, RepoName,
    TemplateContext, TrackerError,
};
use tokio::time::sleep;
use tracing::{debug, info};

/// Locates the board item for a freshly created issue and applies the
/// configured field map to it.
pub struct ProjectItemSynchronizer<'a> {
    board: &'a dyn ProjectBoard,
    settle_delay: Duration,
}

impl<'a> ProjectItemSynchronizer<'a> {
    pub fn new(board: &'a dyn ProjectBoard, settle_delay: Duration) -> Self {
        Self {
            board,
            settle_delay,
        }
    }

    /// Waits for the automation to settle, finds the item for `issue`, then
    /// applies `field_map` in order, one update per entry.
    ///
    /// Stops at the first failed update; fields applied before it stay applied.
    pub async fn sync(
        &self,
        project: &Project,
        owner: &Owner,
        repo: &RepoName,
        issue: IssueNumber,
        field_map: &[FieldMapping],
        context: &TemplateContext,
    ) -> Result<ProjectItem, TrackerError> {
        info!(
            issue_number = %issue,
            delay_secs = self.settle_delay.as_secs(),
            "Waiting for automation to create the project item"
        );
        sleep(self.settle_delay).await;

        let mut item = self
            .board
            .find_item_by_issue_number(project, owner, repo, issue)
            .await?;
        info!(issue_number = %issue, item_id = %item.id, "Found project item");

        for mapping in field_map {
            let value = render(&mapping.field_value, context);
            debug!(field = %mapping.field_name, value = %value, "Updating project item field");
            self.board
                .update_item_field(project, &item, &mapping.field_name, &value)
                .await?;
            item.record(&mapping.field_name, value);
        }

        Ok(item)
    }
}
