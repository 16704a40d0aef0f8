use crate::domain::models::repository::RepositoryCoordinate;
use crate::domain::models::run::{RunPage, Workflow};
use async_trait::async_trait;
use thiserror::Error;

/// Failures of a single GitHub API call.
#[derive(Debug, Error)]
pub enum GitHubApiError {
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response ({status}): {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait GitHubApi {
    async fn list_workflows(
        &self,
        repository: &RepositoryCoordinate,
    ) -> Result<Vec<Workflow>, GitHubApiError>;

    /// Fetches one page of runs, optionally restricted to a single workflow.
    /// Pages are numbered from 1.
    async fn list_runs(
        &self,
        repository: &RepositoryCoordinate,
        workflow_id: Option<u64>,
        page: u32,
    ) -> Result<RunPage, GitHubApiError>;

    async fn delete_run(
        &self,
        repository: &RepositoryCoordinate,
        run_id: u64,
    ) -> Result<(), GitHubApiError>;
}
