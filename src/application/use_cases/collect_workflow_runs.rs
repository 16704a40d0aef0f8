use crate::domain::external_apis::github::{GitHubApi, GitHubApiError};
use crate::domain::models::repository::RepositoryCoordinate;
use crate::domain::models::run::WorkflowRun;
use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::{Stream, TryStreamExt};
use std::sync::Arc;

/// First page requested from the listing endpoint.
const FIRST_PAGE: u32 = 1;

#[derive(Debug, Clone)]
pub struct CollectWorkflowRunsUseCaseInput {
    pub repository: RepositoryCoordinate,
    /// Restrict the listing to a single workflow.
    pub workflow_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CollectWorkflowRunsUseCaseOutput {
    pub runs: Vec<WorkflowRun>,
}

#[async_trait]
pub trait CollectWorkflowRunsUseCase {
    /// Collects every run in server order, or the first error encountered.
    async fn execute(
        &self,
        input: CollectWorkflowRunsUseCaseInput,
    ) -> Result<CollectWorkflowRunsUseCaseOutput, GitHubApiError>;
}

pub struct CollectWorkflowRunsInteractor<G: GitHubApi + Send + Sync + 'static> {
    github_api: Arc<G>,
}

impl<G: GitHubApi + Send + Sync + 'static> CollectWorkflowRunsInteractor<G> {
    pub fn new(github_api: Arc<G>) -> Self {
        Self { github_api }
    }

    /// Streams runs page by page, advancing the cursor until the server
    /// reports no further pages. The stream ends after the first error.
    pub fn stream(
        &self,
        input: CollectWorkflowRunsUseCaseInput,
    ) -> impl Stream<Item = Result<WorkflowRun, GitHubApiError>> + Send + use<G> {
        let github_api = self.github_api.clone();

        try_stream! {
            let mut page = FIRST_PAGE;
            loop {
                tracing::debug!("Fetching workflow runs page {} for {}", page, input.repository);
                let run_page = github_api
                    .list_runs(&input.repository, input.workflow_id, page)
                    .await?;
                tracing::debug!("Page {} returned {} runs", page, run_page.runs.len());

                if run_page.runs.is_empty() {
                    break;
                }
                for run in run_page.runs {
                    yield run;
                }
                if !run_page.has_more {
                    break;
                }
                page += 1;
            }
        }
    }
}

#[async_trait]
impl<G: GitHubApi + Send + Sync + 'static> CollectWorkflowRunsUseCase
    for CollectWorkflowRunsInteractor<G>
{
    async fn execute(
        &self,
        input: CollectWorkflowRunsUseCaseInput,
    ) -> Result<CollectWorkflowRunsUseCaseOutput, GitHubApiError> {
        tracing::info!("Collecting workflow runs for {}", input.repository);
        let runs: Vec<WorkflowRun> = self.stream(input).try_collect().await?;
        tracing::info!("Collected {} workflow runs", runs.len());

        Ok(CollectWorkflowRunsUseCaseOutput { runs })
    }
}
