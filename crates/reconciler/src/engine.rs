//! The reconciliation loop.

use std::sync::Arc;

use alerts::{
    extract, render, Alert, AlertError, AlertSource, Config, Issue, IssueTracker,
    LookupKey, Project, ProjectBoard, ProjectItemId, ReconcileError, RunId, TemplateContext,
};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, info_span, instrument, Instrument};

use crate::{dedup, retry, Pacing, ProjectItemSynchronizer, RetryOutcome};

/// What happened to one alert in a successful pipeline attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    /// A tracking issue was created and its board item synchronised.
    Created {
        /// The persisted issue; `number` is always set.
        issue: Issue,
        item: ProjectItemId,
    },
    /// A tracking issue already existed; nothing was done.
    AlreadyTracked,
    /// Dry run: the issue was built and logged but not persisted.
    DryRun(Issue),
}

/// Counts of per-alert results for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub alerts: usize,
    pub created: usize,
    pub already_tracked: usize,
    pub dry_run: usize,
    pub failed: usize,
    pub exhausted: usize,
}

impl RunSummary {
    fn new(run_id: RunId, alerts: usize) -> Self {
        Self {
            run_id,
            alerts,
            created: 0,
            already_tracked: 0,
            dry_run: 0,
            failed: 0,
            exhausted: 0,
        }
    }

    fn record(&mut self, outcome: &RetryOutcome<AlertOutcome>) {
        match outcome {
            RetryOutcome::Completed(AlertOutcome::Created { .. }) => self.created += 1,
            RetryOutcome::Completed(AlertOutcome::AlreadyTracked) => self.already_tracked += 1,
            RetryOutcome::Completed(AlertOutcome::DryRun(_)) => self.dry_run += 1,
            RetryOutcome::Failed(_) => self.failed += 1,
            RetryOutcome::Exhausted { .. } => self.exhausted += 1,
        }
    }
}

/// Drives one reconciliation run: resolve the board, fetch the alerts once,
/// then reconcile them one at a time.
pub struct Reconciler {
    config: Config,
    alerts: Arc<dyn AlertSource>,
    tracker: Arc<dyn IssueTracker>,
    board: Arc<dyn ProjectBoard>,
    pacing: Pacing,
    dry_run: bool,
    run_id: RunId,
}

impl Reconciler {
    pub fn new(
        config: Config,
        alerts: Arc<dyn AlertSource>,
        tracker: Arc<dyn IssueTracker>,
        board: Arc<dyn ProjectBoard>,
    ) -> Self {
        Self {
            config,
            alerts,
            tracker,
            board,
            pacing: Pacing::default(),
            dry_run: false,
            run_id: RunId::new_random(),
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// In dry-run mode issues are built and logged, never persisted, and the
    /// board is never touched beyond resolving the project.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Runs the loop to completion.
    ///
    /// Only startup failures are returned as errors; per-alert failures are
    /// logged and counted in the [`RunSummary`].
    #[instrument(
        name = "reconcile_run",
        skip(self),
        fields(
            run_id = %self.run_id,
            owner = %self.config.github.owner,
            repo = %self.config.github.repo,
            dry_run = self.dry_run,
        )
    )]
    pub async fn run(&self) -> Result<RunSummary, ReconcileError> {
        let settings = &self.config.github;

        let project = self
            .board
            .resolve_project(&settings.project_id)
            .await
            .map_err(|source| ReconcileError::ProjectUnresolvable {
                project_id: settings.project_id.clone(),
                source,
            })?;
        info!(project = %project.title, fields = project.fields.len(), "Resolved project");

        let alerts = self
            .alerts
            .get_alerts(&settings.owner, &settings.repo)
            .await
            .map_err(|source| ReconcileError::AlertsUnavailable {
                owner: settings.owner.to_string(),
                repo: settings.repo.to_string(),
                source,
            })?;
        info!(count = alerts.len(), "Found Dependabot alerts");

        let mut summary = RunSummary::new(self.run_id, alerts.len());
        for alert in &alerts {
            let outcome = self
                .process_alert(&project, alert)
                .instrument(info_span!("reconcile_alert", alert_number = %alert.number))
                .await;
            summary.record(&outcome);
            sleep(self.pacing.inter_alert_delay).await;
        }

        info!(
            created = summary.created,
            already_tracked = summary.already_tracked,
            dry_run = summary.dry_run,
            failed = summary.failed,
            exhausted = summary.exhausted,
            "Run complete"
        );
        Ok(summary)
    }

    /// Reconciles one alert under the retry controller.
    pub async fn process_alert(&self, project: &Project, alert: &Alert) -> RetryOutcome<AlertOutcome> {
        retry::run_with_backoff(alert.number, &self.pacing.backoff, |_attempt| {
            self.reconcile_alert(project, alert)
        })
        .await
    }

    /// One attempt of the per-alert pipeline: dedup, extract, render, build,
    /// persist, synchronise.
    async fn reconcile_alert(&self, project: &Project, alert: &Alert) -> Result<AlertOutcome, AlertError> {
        let settings = &self.config.github;
        let key = LookupKey::new(&settings.repo, alert.number);

        if dedup::issue_exists(self.tracker.as_ref(), &settings.owner, &settings.repo, &key).await? {
            info!(alert_number = %alert.number, lookup_key = %key, "Issue already exists for alert; skipping");
            return Ok(AlertOutcome::AlreadyTracked);
        }

        let details = extract(alert, &self.config.remediation_sla)?;
        let context = TemplateContext::for_alert(&details);
        info!(
            alert_number = %details.number,
            severity = details.severity.as_str(),
            package = %details.package_name,
            ecosystem = %details.ecosystem,
            created_at = %details.created_at,
            remediation_deadline = %details.remediation_deadline,
            "Processing alert"
        );

        let issue = self.build_issue(&key, &details.ecosystem, &context);

        if self.dry_run {
            info!(alert_number = %alert.number, issue = ?issue, "Dry run: would have created issue");
            return Ok(AlertOutcome::DryRun(issue));
        }

        let number = self.tracker.create_issue(&issue).await?;
        let issue = issue.persisted(number);
        info!(alert_number = %alert.number, issue_number = %number, title = %issue.title, "Created tracking issue");

        let item = ProjectItemSynchronizer::new(self.board.as_ref(), self.pacing.settle_delay)
            .sync(
                project,
                &settings.owner,
                &settings.repo,
                number,
                &settings.field_map,
                &context,
            )
            .await?;
        info!(issue_number = %number, item_id = %item.id, fields = item.fields.len(), "Project item synchronised");

        Ok(AlertOutcome::Created {
            issue,
            item: item.id,
        })
    }

    fn build_issue(&self, key: &LookupKey, ecosystem: &str, context: &TemplateContext) -> Issue {
        let settings = &self.config.github;
        let templates = &settings.issue;

        Issue::build(
            settings.owner.clone(),
            settings.repo.clone(),
            key.title_with(&render(&templates.title, context)),
            render(&templates.body, context),
            templates.labels.iter().map(|label| render(label, context)),
            templates.assignees.assignees_for(ecosystem),
        )
    }
}
