//! One webhook delivery's worth of work: exchange the app identity for an
//! installation token, point the indexer at the repository, run it, and post
//! the indexed file listing as a PR comment.

use std::path::PathBuf;
use std::sync::Arc;

use octocrab::Octocrab;
use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::process::Command;

use crate::github;
use crate::queue::Job;
use crate::utils::PipeMap;

mod config;
mod tree;

/// Settings shared by every indexing job.
pub(crate) struct IndexerSettings {
    /// Root directory bind-mounted into the indexer container.
    pub(crate) data_dir: PathBuf,
    /// HTTP proxy to route the container through, if any.
    pub(crate) proxy_url: Option<String>,
}

/// Terminal job failures. Jobs are never retried; the consumer loop logs
/// these and moves on to the next job.
#[derive(Debug, Error)]
pub(crate) enum JobError {
    #[error("failed to exchange installation token: {0}")]
    TokenExchange(#[source] octocrab::Error),
    #[error(transparent)]
    ConfigWrite(#[from] config::ConfigWriteError),
    #[error("indexer failed: {0}")]
    Indexing(String),
    #[error("failed to post comment: {0}")]
    CommentPost(#[source] octocrab::Error),
}

pub(crate) struct IndexJob {
    pub(crate) owner: String,
    pub(crate) repo: String,
    pub(crate) pr_number: u64,
    github_client: Arc<Octocrab>,
    settings: Arc<IndexerSettings>,
}

impl IndexJob {
    pub(crate) fn new(
        owner: String,
        repo: String,
        pr_number: u64,
        github_client: Arc<Octocrab>,
        settings: Arc<IndexerSettings>,
    ) -> Self {
        IndexJob {
            owner,
            repo,
            pr_number,
            github_client,
            settings,
        }
    }

    async fn execute(&self) -> Result<(), JobError> {
        let (installation_client, token) =
            github::installation_token(&self.github_client, &self.owner, &self.repo)
                .await
                .map_err(JobError::TokenExchange)?;
        let clone_url = format!(
            "https://oauth2:{}@github.com/{}/{}",
            token.expose_secret(),
            self.owner,
            self.repo
        );

        config::write(&self.settings.data_dir, &clone_url)?;

        tracing::info!("indexing {}/{}", self.owner, self.repo);
        self.run_indexer().await?;

        let repo_dir = self
            .settings
            .data_dir
            .join("repositories")
            .join(tree::directory_name(&clone_url));
        let listing = tree::render(&repo_dir)
            .map_err(|error| JobError::Indexing(format!("failed to read indexed repository: {error}")))?;

        installation_client
            .issues(&self.owner, &self.repo)
            .create_comment(self.pr_number, listing)
            .await
            .map_err(JobError::CommentPost)?;
        tracing::info!(
            "posted listing for {}/{} PR #{}",
            self.owner,
            self.repo,
            self.pr_number
        );
        Ok(())
    }

    /// Runs the containerized indexer to completion. Anything on stderr
    /// counts as failure, whatever the exit code says.
    async fn run_indexer(&self) -> Result<(), JobError> {
        let mount = format!("{}:/data", self.settings.data_dir.display());
        let output = Command::new("docker")
            .arg("run")
            .pipe_map(self.settings.proxy_url.as_deref(), |cmd, proxy| {
                cmd.arg("-e")
                    .arg(format!("HTTP_PROXY={proxy}"))
                    .arg("-e")
                    .arg(format!("HTTPS_PROXY={proxy}"))
                    .args(["--network", "host"])
            })
            .args(["-v", &mount, "tabbyml/tabby", "scheduler", "--now"])
            .output()
            .await
            .map_err(|error| JobError::Indexing(format!("failed to run indexer: {error}")))?;
        if !output.stderr.is_empty() {
            return Err(JobError::Indexing(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(())
    }
}

impl Job for IndexJob {
    type Error = JobError;

    async fn run(&self) -> Result<(), JobError> {
        self.execute().await
    }
}
