//! In-memory [`GitHubApi`] used by unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::external_apis::github::{GitHubApi, GitHubApiError};
use crate::domain::models::repository::RepositoryCoordinate;
use crate::domain::models::run::{RunPage, Workflow, WorkflowRun};
use crate::infrastructures::adapters::primary::console::Console;

pub fn repository() -> RepositoryCoordinate {
    RepositoryCoordinate {
        owner: "octo-org".to_string(),
        name: "hello-world".to_string(),
    }
}

pub fn workflow_run(id: u64, workflow_id: u64) -> WorkflowRun {
    let created_at: DateTime<Utc> = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .unwrap();
    WorkflowRun {
        id,
        workflow_id,
        name: format!("Workflow {workflow_id}"),
        display_title: format!("Run {id}"),
        head_branch: Some("main".to_string()),
        status: "completed".to_string(),
        conclusion: Some("success".to_string()),
        created_at,
    }
}

pub fn workflow(id: u64, name: &str, path: &str) -> Workflow {
    Workflow {
        id,
        name: name.to_string(),
        path: path.to_string(),
    }
}

#[derive(Default)]
pub struct FakeGitHubApi {
    pages: Vec<Vec<WorkflowRun>>,
    workflows: Vec<Workflow>,
    list_error: Option<(u32, fn() -> GitHubApiError)>,
    failing_deletes: HashSet<u64>,
    list_calls: Mutex<Vec<(Option<u64>, u32)>>,
    delete_calls: Mutex<Vec<u64>>,
}

impl FakeGitHubApi {
    pub fn with_pages(pages: Vec<Vec<WorkflowRun>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn with_workflows(mut self, workflows: Vec<Workflow>) -> Self {
        self.workflows = workflows;
        self
    }

    /// Makes the listing fail once `page` is requested.
    pub fn failing_list_at(mut self, page: u32, error: fn() -> GitHubApiError) -> Self {
        self.list_error = Some((page, error));
        self
    }

    pub fn failing_deletes(mut self, run_ids: &[u64]) -> Self {
        self.failing_deletes = run_ids.iter().copied().collect();
        self
    }

    pub fn list_calls(&self) -> Vec<(Option<u64>, u32)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<u64> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubApi for FakeGitHubApi {
    async fn list_workflows(
        &self,
        _repository: &RepositoryCoordinate,
    ) -> Result<Vec<Workflow>, GitHubApiError> {
        Ok(self.workflows.clone())
    }

    async fn list_runs(
        &self,
        _repository: &RepositoryCoordinate,
        workflow_id: Option<u64>,
        page: u32,
    ) -> Result<RunPage, GitHubApiError> {
        self.list_calls.lock().unwrap().push((workflow_id, page));
        if let Some((failing_page, error)) = self.list_error {
            if page >= failing_page {
                return Err(error());
            }
        }

        let index = page as usize - 1;
        let runs = self
            .pages
            .get(index)
            .map(|runs| {
                runs.iter()
                    .filter(|run| workflow_id.is_none_or(|id| run.workflow_id == id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(RunPage {
            runs,
            has_more: index + 1 < self.pages.len(),
        })
    }

    async fn delete_run(
        &self,
        _repository: &RepositoryCoordinate,
        run_id: u64,
    ) -> Result<(), GitHubApiError> {
        self.delete_calls.lock().unwrap().push(run_id);
        if self.failing_deletes.contains(&run_id) {
            return Err(GitHubApiError::UnexpectedStatus {
                status: 500,
                message: format!("run {run_id} could not be deleted"),
            });
        }
        Ok(())
    }
}

/// Console that answers prompts from a script and records everything shown.
pub struct ScriptedConsole {
    interactive: bool,
    answers: std::collections::VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    pub fn interactive(answers: &[&str]) -> Self {
        colored::control::set_override(false);
        Self {
            interactive: true,
            answers: answers.iter().map(|answer| (*answer).to_string()).collect(),
            output: Vec::new(),
        }
    }

    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::interactive(&[])
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.output.iter().any(|line| line.contains(text))
    }

    pub fn lines(&self) -> &[String] {
        &self.output
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn prompt(&mut self, question: &str) -> std::io::Result<Option<String>> {
        self.output.push(question.to_string());
        Ok(self.answers.pop_front())
    }
}
