use crate::application::use_cases::select_workflow_runs::Selection;
use crate::domain::external_apis::github::{GitHubApi, GitHubApiError};
use crate::domain::models::repository::RepositoryCoordinate;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct DeleteWorkflowRunsUseCaseInput {
    pub repository: RepositoryCoordinate,
    pub selection: Selection,
}

#[derive(Debug)]
pub struct DeletionOutcome {
    pub run_id: u64,
    pub result: Result<(), GitHubApiError>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{failed} of {total} workflow run deletions failed")]
pub struct PartialDeletionFailure {
    pub failed: usize,
    pub total: usize,
}

/// Per-run outcomes, in the order the deletions were issued.
#[derive(Debug, Default)]
pub struct DeletionReport {
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }

    /// # Errors
    ///
    /// Returns [`PartialDeletionFailure`] if any deletion failed.
    pub fn into_result(self) -> Result<Self, PartialDeletionFailure> {
        let failed = self.failed().count();
        if failed == 0 {
            Ok(self)
        } else {
            Err(PartialDeletionFailure {
                failed,
                total: self.outcomes.len(),
            })
        }
    }
}

#[async_trait]
pub trait DeleteWorkflowRunsUseCase {
    async fn execute(&self, input: DeleteWorkflowRunsUseCaseInput) -> DeletionReport;
}

pub struct DeleteWorkflowRunsInteractor<G: GitHubApi + Send + Sync + 'static> {
    github_api: Arc<G>,
}

impl<G: GitHubApi + Send + Sync + 'static> DeleteWorkflowRunsInteractor<G> {
    pub fn new(github_api: Arc<G>) -> Self {
        Self { github_api }
    }
}

#[async_trait]
impl<G: GitHubApi + Send + Sync + 'static> DeleteWorkflowRunsUseCase
    for DeleteWorkflowRunsInteractor<G>
{
    /// Deletes the selected runs one at a time. A failed deletion is
    /// recorded and does not stop the remaining ones.
    async fn execute(&self, input: DeleteWorkflowRunsUseCaseInput) -> DeletionReport {
        let total = input.selection.len();
        tracing::info!("Deleting {} workflow runs from {}", total, input.repository);

        let mut report = DeletionReport::default();
        for (i, &run_id) in input.selection.run_ids().iter().enumerate() {
            tracing::debug!("Deleting run {} ({}/{})", run_id, i + 1, total);
            let result = self.github_api.delete_run(&input.repository, run_id).await;
            if let Err(e) = &result {
                tracing::warn!("Failed to delete run {}: {}", run_id, e);
            }
            report.outcomes.push(DeletionOutcome { run_id, result });
        }

        tracing::info!(
            "Deleted {} of {} workflow runs",
            report.succeeded().count(),
            total
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::select_workflow_runs::{
        SelectionRequest, resolve_selection,
    };
    use crate::domain::models::run::WorkflowRun;
    use crate::testing::{FakeGitHubApi, repository, workflow_run};

    fn runs(ids: &[u64]) -> Vec<WorkflowRun> {
        ids.iter().map(|&id| workflow_run(id, 1)).collect()
    }

    fn input(selection: Selection) -> DeleteWorkflowRunsUseCaseInput {
        DeleteWorkflowRunsUseCaseInput {
            repository: repository(),
            selection,
        }
    }

    #[tokio::test]
    async fn test_deletes_every_selected_run() {
        let listing = runs(&[101, 102, 103]);
        let api = Arc::new(FakeGitHubApi::with_pages(vec![listing.clone()]));
        let interactor = DeleteWorkflowRunsInteractor::new(api.clone());
        let selection = resolve_selection(&SelectionRequest::All, &listing).unwrap();

        let report = interactor.execute(input(selection)).await;

        assert_eq!(api.delete_calls(), vec![101, 102, 103]);
        assert_eq!(report.succeeded().count(), 3);
        assert!(report.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_remaining_deletions() {
        let listing = runs(&[1, 2, 3, 4, 5]);
        for failing in [vec![], vec![3], vec![1, 5], vec![1, 2, 3, 4, 5]] {
            let api = Arc::new(FakeGitHubApi::default().failing_deletes(&failing));
            let interactor = DeleteWorkflowRunsInteractor::new(api.clone());
            let selection = resolve_selection(&SelectionRequest::All, &listing).unwrap();

            let report = interactor.execute(input(selection)).await;

            assert_eq!(api.delete_calls(), vec![1, 2, 3, 4, 5]);
            assert_eq!(report.outcomes.len(), 5);
            let failed: Vec<u64> = report.failed().map(|outcome| outcome.run_id).collect();
            assert_eq!(failed, failing);
            match report.into_result() {
                Ok(_) => assert!(failing.is_empty()),
                Err(e) => assert_eq!(
                    e,
                    PartialDeletionFailure {
                        failed: failing.len(),
                        total: 5
                    }
                ),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_selection_issues_no_calls() {
        let api = Arc::new(FakeGitHubApi::default());
        let interactor = DeleteWorkflowRunsInteractor::new(api.clone());

        let report = interactor.execute(input(Selection::default())).await;

        assert!(api.delete_calls().is_empty());
        assert!(report.outcomes.is_empty());
    }
}
