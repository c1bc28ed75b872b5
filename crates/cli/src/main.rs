//! Dependaboat CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse arguments**: config path, tokens, dry-run flag, API URL.
//! 2. **Wire observability**: `tracing-subscriber` with a text or JSON layer
//!    and, when configured, an OpenTelemetry OTLP exporter. All `tracing`
//!    spans and events emitted by every crate in the workspace flow through it.
//! 3. **Load configuration**: read the YAML file and validate it into
//!    [`alerts::Config`].
//! 4. **Construct infrastructure**: one [`github::GithubClient`] per API
//!    family, each with its own token, wrapped in the adapters and injected
//!    into [`reconciler::Reconciler`].
//! 5. **Run once** and map the outcome to an exit code. Per-alert failures are
//!    logged and do not change the exit code; startup failures do.

mod args;
mod observability;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use alerts::{Config, ConfigError};
use anyhow::Context;
use clap::Parser;
use github::{GithubAlertSource, GithubClient, GithubIssueTracker, GithubProjectBoard};
use reconciler::{Reconciler, RunSummary};
use tracing::{error, info};

use crate::args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(cli).await {
        Ok(summary) => {
            info!(
                failed = summary.failed,
                exhausted = summary.exhausted,
                "Dependaboat finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = format!("{e:#}"), "Dependaboat aborted");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    let config = load_config(&cli.config_file)?;
    info!(
        config = %serde_json::to_string(&config)?,
        path = %cli.config_file.display(),
        "Loaded configuration"
    );

    let tokens = cli.tokens.resolve()?;
    let client = |token: &str| {
        GithubClient::with_api_url(token, cli.api_url.as_str())
            .context("Failed to build GitHub client")
    };

    let reconciler = Reconciler::new(
        config,
        Arc::new(GithubAlertSource::new(client(&tokens.alerts)?)),
        Arc::new(GithubIssueTracker::new(client(&tokens.issues)?)),
        Arc::new(GithubProjectBoard::new(client(&tokens.projects)?)),
    )
    .with_dry_run(cli.dry_run);

    info!(
        run_id = %reconciler.run_id(),
        dry_run = cli.dry_run,
        api_url = %cli.api_url,
        "Starting reconciliation"
    );

    Ok(reconciler.run().await?)
}

fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let document = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Config::from_yaml_str(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
github:
  project_id: PVT_security
  owner: acme
  repo: webapp
  issue:
    title: "{{alert_severity}}: {{alert_package_name}}"
    body: "Due {{remediation_deadline}}"
remediation_sla:
  high: 3
"#;

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_config(Path::new("/nonexistent/dependaboat.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }), "{err}");
    }

    #[test]
    fn loads_config_from_disk() {
        let path = std::env::temp_dir().join(format!("dependaboat-{}.yml", std::process::id()));
        std::fs::write(&path, MINIMAL).unwrap();

        let config = load_config(&path);
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.github.owner.as_str(), "acme");
        assert!(config.github.field_map.is_empty());
    }
}
