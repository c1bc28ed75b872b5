//! Dependabot alerts REST endpoint.

use alerts::{Alert, AlertNumber, AlertSource, Owner, RepoName, TrackerError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::GithubClient;

#[derive(Debug, Deserialize)]
struct AlertPayload {
    number: u64,
    created_at: Option<String>,
    html_url: Option<String>,
    security_vulnerability: VulnerabilityPayload,
    security_advisory: Option<AdvisoryPayload>,
}

#[derive(Debug, Deserialize)]
struct VulnerabilityPayload {
    severity: String,
    package: PackagePayload,
}

#[derive(Debug, Deserialize)]
struct PackagePayload {
    ecosystem: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AdvisoryPayload {
    ghsa_id: Option<String>,
    summary: Option<String>,
}

impl From<AlertPayload> for Alert {
    fn from(payload: AlertPayload) -> Self {
        let (ghsa_id, summary) = payload
            .security_advisory
            .map(|a| (a.ghsa_id, a.summary))
            .unwrap_or_default();
        Self {
            number: AlertNumber::new(payload.number),
            severity: payload.security_vulnerability.severity,
            package_name: payload.security_vulnerability.package.name,
            ecosystem: payload.security_vulnerability.package.ecosystem,
            created_at: payload.created_at,
            summary,
            ghsa_id,
            html_url: payload.html_url,
        }
    }
}

/// Reads open Dependabot alerts. Authenticated with the REST-client token.
#[derive(Debug, Clone)]
pub struct GithubAlertSource {
    client: GithubClient,
}

impl GithubAlertSource {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AlertSource for GithubAlertSource {
    #[instrument(skip_all, fields(owner = %owner, repo = %repo))]
    async fn get_alerts(&self, owner: &Owner, repo: &RepoName) -> Result<Vec<Alert>, TrackerError> {
        let first = self
            .client
            .get(&self.client.url(&format!("/repos/{owner}/{repo}/dependabot/alerts")))
            .query(&[("state", "open"), ("per_page", "100")]);

        let mut page = self.client.send::<Vec<AlertPayload>>(first).await?;
        let mut alerts: Vec<Alert> = Vec::new();

        loop {
            debug!(count = page.value.len(), "Fetched page of Dependabot alerts");
            alerts.extend(page.value.into_iter().map(Alert::from));

            match page.next {
                Some(next) => page = self.client.send(self.client.get(&next)).await?,
                None => break,
            }
        }

        Ok(alerts)
    }
}
