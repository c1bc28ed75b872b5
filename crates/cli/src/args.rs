//! Command-line arguments and credential routing.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, ValueEnum};

/// Open a GitHub issue for every open Dependabot alert and track it on a
/// ProjectV2 board.
#[derive(Debug, Parser)]
#[command(name = "dependaboat", version)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config_file: PathBuf,

    #[command(flatten)]
    pub tokens: TokenArgs,

    /// Build and log issues without creating them or touching the board.
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// GitHub API base URL (GitHub Enterprise Server: `https://<host>/api/v3`).
    #[arg(long, value_name = "URL", default_value = github::DEFAULT_API_URL)]
    pub api_url: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// GitHub credentials. `--gh-token` is the fallback for each API family.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TokenArgs {
    /// Token used for every API unless a more specific token is given.
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// Token for issue search and creation.
    #[arg(long, env = "OCTOKIT_TOKEN", hide_env_values = true)]
    pub octokit_token: Option<String>,

    /// Token for ProjectV2 queries and mutations.
    #[arg(long, env = "GRAPHQL_TOKEN", hide_env_values = true)]
    pub graphql_token: Option<String>,

    /// Token for the Dependabot alerts endpoint.
    #[arg(long, env = "REST_CLIENT_TOKEN", hide_env_values = true)]
    pub rest_client_token: Option<String>,
}

/// One token per API family, after fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub issues: String,
    pub projects: String,
    pub alerts: String,
}

impl TokenArgs {
    /// Applies the `--gh-token` fallback. Blank values count as absent.
    pub fn resolve(&self) -> anyhow::Result<Tokens> {
        let pick = |specific: &Option<String>, flag: &str| {
            non_blank(specific)
                .or_else(|| non_blank(&self.gh_token))
                .map(str::to_string)
                .ok_or_else(|| anyhow!("No GitHub token for --{flag}; pass --gh-token or --{flag}"))
        };

        Ok(Tokens {
            issues: pick(&self.octokit_token, "octokit-token")?,
            projects: pick(&self.graphql_token, "graphql-token")?,
            alerts: pick(&self.rest_client_token, "rest-client-token")?,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
