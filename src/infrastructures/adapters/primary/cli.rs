use crate::application::use_cases::collect_workflow_runs::{
    CollectWorkflowRunsInteractor, CollectWorkflowRunsUseCase, CollectWorkflowRunsUseCaseInput,
};
use crate::application::use_cases::delete_workflow_runs::{
    DeleteWorkflowRunsInteractor, DeleteWorkflowRunsUseCase, DeleteWorkflowRunsUseCaseInput,
};
use crate::application::use_cases::select_workflow_runs::{
    Selection, SelectionError, SelectionRequest, parse_selection, resolve_selection,
};
use crate::domain::external_apis::github::{GitHubApi, GitHubApiError};
use crate::domain::models::repository::RepositoryCoordinate;
use crate::domain::models::run::WorkflowRun;
use crate::infrastructures::adapters::primary::console::Console;
use crate::infrastructures::adapters::primary::presenter;
use crate::infrastructures::adapters::secondary::external_apis::github::DEFAULT_API_URL;
use clap::{ArgAction, Parser};
use colored::Colorize;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

const SELECTION_PROMPT: &str =
    "\nRuns to delete (e.g. 1,3,5-7), `all`, `workflow <ID>`, or empty to quit: ";

/// List and delete GitHub Actions workflow runs of a repository.
#[derive(Parser, Debug)]
#[command(name = "gha-run-cleaner", version, about, long_about = None)]
pub struct Cli {
    /// Repository as OWNER/NAME; defaults to the GitHub remote of the current checkout
    #[arg(short = 'R', long = "repo", env = "GITHUB_REPOSITORY", value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// GitHub token; defaults to `gh auth token`
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Only list runs of this workflow (name, file name, path or id)
    #[arg(short, long, value_name = "WORKFLOW")]
    pub workflow: Option<String>,

    /// Select every listed run without prompting
    #[arg(long, conflicts_with = "run_ids")]
    pub all: bool,

    /// Select this run without prompting (repeatable)
    #[arg(long = "run-id", value_name = "ID")]
    pub run_ids: Vec<u64>,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Selection requested through flags, if any.
    #[must_use]
    pub fn selection_request(&self) -> Option<SelectionRequest> {
        if self.all {
            Some(SelectionRequest::All)
        } else if self.run_ids.is_empty() {
            None
        } else {
            Some(SelectionRequest::RunIds(self.run_ids.clone()))
        }
    }

    #[must_use]
    pub fn clean_options(&self, repository: RepositoryCoordinate) -> CleanOptions {
        CleanOptions {
            repository,
            workflow: self.workflow.clone(),
            preselected: self.selection_request(),
            assume_yes: self.yes,
        }
    }
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Runs were deleted, or there was nothing to do.
    Success = 0,
    /// Aborted before any deletion.
    Failure = 1,
    /// At least one deletion failed.
    DeletionFailed = 2,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status as u8)
    }
}

#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub repository: RepositoryCoordinate,
    pub workflow: Option<String>,
    /// Selection made up front; the user is prompted when absent.
    pub preselected: Option<SelectionRequest>,
    pub assume_yes: bool,
}

#[derive(Debug, Error)]
pub enum CleanerError {
    #[error("failed to list workflows of {repository}: {source}")]
    ListWorkflows {
        repository: RepositoryCoordinate,
        source: GitHubApiError,
    },

    #[error("no workflow of {repository} matches `{filter}`")]
    UnknownWorkflow {
        repository: RepositoryCoordinate,
        filter: String,
    },

    #[error("failed to list workflow runs of {repository}: {source}")]
    ListRuns {
        repository: RepositoryCoordinate,
        source: GitHubApiError,
    },

    #[error("invalid selection: {0}")]
    Selection(#[from] SelectionError),

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Drives one invocation: list, select, confirm, delete and report.
pub struct WorkflowRunCleaner<G: GitHubApi + Send + Sync + 'static, C: Console> {
    github_api: Arc<G>,
    collect_use_case: CollectWorkflowRunsInteractor<G>,
    delete_use_case: DeleteWorkflowRunsInteractor<G>,
    console: C,
}

impl<G: GitHubApi + Send + Sync + 'static, C: Console> WorkflowRunCleaner<G, C> {
    pub fn new(github_api: Arc<G>, console: C) -> Self {
        Self {
            collect_use_case: CollectWorkflowRunsInteractor::new(github_api.clone()),
            delete_use_case: DeleteWorkflowRunsInteractor::new(github_api.clone()),
            github_api,
            console,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Runs the whole flow and maps its outcome to an exit status.
    pub async fn run(&mut self, options: CleanOptions) -> ExitStatus {
        match self.try_run(options).await {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!("Aborting: {}", e);
                self.console
                    .print(&format!("{} {e}", "error:".red().bold()));
                ExitStatus::Failure
            }
        }
    }

    async fn try_run(&mut self, options: CleanOptions) -> Result<ExitStatus, CleanerError> {
        let repository = options.repository;

        let workflow_id = match options.workflow.as_deref() {
            Some(filter) => Some(self.resolve_workflow(&repository, filter).await?),
            None => None,
        };

        self.console
            .print(&format!("Fetching workflow runs for {repository}..."));
        let runs = self
            .collect_use_case
            .execute(CollectWorkflowRunsUseCaseInput {
                repository: repository.clone(),
                workflow_id,
            })
            .await
            .map_err(|source| CleanerError::ListRuns {
                repository: repository.clone(),
                source,
            })?
            .runs;

        if runs.is_empty() {
            self.console.print("No workflow runs found.");
            return Ok(ExitStatus::Success);
        }
        for line in presenter::render_runs(&runs) {
            self.console.print(&line);
        }

        let selection = self.select(&runs, options.preselected.as_ref())?;
        if selection.is_empty() {
            self.console.print("No runs selected, nothing to delete.");
            return Ok(ExitStatus::Success);
        }

        if !options.assume_yes && !self.confirm(&repository, selection.len())? {
            self.console.print("Aborted, no runs deleted.");
            return Ok(ExitStatus::Success);
        }

        let report = self
            .delete_use_case
            .execute(DeleteWorkflowRunsUseCaseInput {
                repository,
                selection,
            })
            .await;
        for line in presenter::render_report(&report) {
            self.console.print(&line);
        }

        Ok(match report.into_result() {
            Ok(_) => ExitStatus::Success,
            Err(failure) => {
                self.console
                    .print(&format!("{} {failure}", "error:".red().bold()));
                ExitStatus::DeletionFailed
            }
        })
    }

    async fn resolve_workflow(
        &self,
        repository: &RepositoryCoordinate,
        filter: &str,
    ) -> Result<u64, CleanerError> {
        let workflows = self
            .github_api
            .list_workflows(repository)
            .await
            .map_err(|source| CleanerError::ListWorkflows {
                repository: repository.clone(),
                source,
            })?;

        let workflow = workflows
            .iter()
            .find(|workflow| workflow.matches(filter))
            .ok_or_else(|| CleanerError::UnknownWorkflow {
                repository: repository.clone(),
                filter: filter.to_string(),
            })?;
        tracing::info!("Using workflow {} ({})", workflow.name, workflow.id);
        Ok(workflow.id)
    }

    fn select(
        &mut self,
        runs: &[WorkflowRun],
        preselected: Option<&SelectionRequest>,
    ) -> Result<Selection, CleanerError> {
        if let Some(request) = preselected {
            return Ok(resolve_selection(request, runs)?);
        }
        if !self.console.is_interactive() {
            self.console
                .print("No terminal attached; pass --all or --run-id to select runs.");
            return Ok(Selection::default());
        }

        for line in presenter::render_workflow_summary(runs) {
            self.console.print(&line);
        }
        loop {
            let Some(answer) = self.console.prompt(SELECTION_PROMPT)? else {
                return Ok(Selection::default());
            };
            match parse_selection(&answer).and_then(|request| resolve_selection(&request, runs)) {
                Ok(selection) => return Ok(selection),
                Err(e) => self.console.print(&format!("{e}, try again.")),
            }
        }
    }

    fn confirm(
        &mut self,
        repository: &RepositoryCoordinate,
        count: usize,
    ) -> Result<bool, CleanerError> {
        if !self.console.is_interactive() {
            self.console
                .print("No terminal attached; pass --yes to confirm the deletion.");
            return Ok(false);
        }

        let question = format!("Delete {count} workflow run(s) from {repository}? [y/N] ");
        let answer = self.console.prompt(&question)?.unwrap_or_default();
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}
