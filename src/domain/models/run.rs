use chrono::{DateTime, Utc};

/// A single execution of a workflow, as listed by the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    pub id: u64,
    pub workflow_id: u64,
    /// Name of the workflow the run belongs to.
    pub name: String,
    pub display_title: String,
    pub head_branch: Option<String>,
    pub status: String,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowRun {
    /// The conclusion for completed runs, the status otherwise.
    #[must_use]
    pub fn state(&self) -> &str {
        if self.status == "completed" {
            self.conclusion.as_deref().unwrap_or(&self.status)
        } else {
            &self.status
        }
    }
}

/// A workflow definition of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub path: String,
}

impl Workflow {
    /// Whether `filter` names this workflow by id, name, path or file name.
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim();
        if filter.parse::<u64>().is_ok_and(|id| id == self.id) {
            return true;
        }
        let file_name = self.path.rsplit('/').next().unwrap_or(&self.path);
        self.name.eq_ignore_ascii_case(filter) || self.path == filter || file_name == filter
    }
}

/// One page of a workflow run listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunPage {
    pub runs: Vec<WorkflowRun>,
    pub has_more: bool,
}
