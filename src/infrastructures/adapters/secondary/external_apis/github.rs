use crate::domain::external_apis::github::{GitHubApi, GitHubApiError};
use crate::domain::models::repository::RepositoryCoordinate;
use crate::domain::models::run::{RunPage, Workflow, WorkflowRun};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size the GitHub API accepts.
const PER_PAGE: u32 = 100;

const API_VERSION: &str = "2022-11-28";

#[derive(Deserialize, Debug, Clone)]
struct GitHubWorkflowRunResponse {
    id: u64,
    workflow_id: u64,
    name: Option<String>, // workflow name
    display_title: String,
    head_branch: Option<String>,
    status: Option<String>,
    conclusion: Option<String>,
    created_at: String, // ISO 8601 format, parse during domain model conversion
}

#[derive(Deserialize, Debug)]
struct GitHubWorkflowRunsApiResponse {
    total_count: u64,
    workflow_runs: Vec<GitHubWorkflowRunResponse>,
}

#[derive(Deserialize, Debug, Clone)]
struct GitHubWorkflowResponse {
    id: u64,
    name: String,
    path: String,
}

#[derive(Deserialize, Debug)]
struct GitHubWorkflowsApiResponse {
    total_count: u64,
    workflows: Vec<GitHubWorkflowResponse>,
}

#[derive(Deserialize, Debug)]
struct GitHubErrorResponse {
    message: String,
}

pub struct GitHubApiAdapter {
    client: Client,
    base_url: String,
    github_token: String,
}

impl GitHubApiAdapter {
    pub fn new(base_url: String, github_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            github_token,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.github_token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, "gha-run-cleaner")
    }

    /// Sends the request once and maps non-success statuses to errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, GitHubApiError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| GitHubApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &headers, &body))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, GitHubApiError> {
        self.send(self.client.get(url))
            .await?
            .json::<T>()
            .await
            .map_err(|e| GitHubApiError::Decode(e.to_string()))
    }
}

fn classify_error(status: StatusCode, headers: &HeaderMap, body: &str) -> GitHubApiError {
    let message = serde_json::from_str::<GitHubErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let rate_limit_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|remaining| remaining.trim() == "0");

    match status {
        StatusCode::TOO_MANY_REQUESTS => GitHubApiError::RateLimit(message),
        StatusCode::FORBIDDEN if rate_limit_exhausted => GitHubApiError::RateLimit(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GitHubApiError::Auth {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => GitHubApiError::NotFound(message),
        _ => GitHubApiError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        },
    }
}

fn has_more(page: u32, per_page: u32, returned: usize, total_count: u64) -> bool {
    returned > 0 && u64::from(page) * u64::from(per_page) < total_count
}

impl TryFrom<GitHubWorkflowRunResponse> for WorkflowRun {
    type Error = GitHubApiError;

    fn try_from(run_res: GitHubWorkflowRunResponse) -> Result<Self, Self::Error> {
        // Parse ISO 8601 string to DateTime<Utc>
        let created_at = chrono::DateTime::parse_from_rfc3339(&run_res.created_at)
            .map_err(|e| {
                GitHubApiError::Decode(format!("invalid created_at for run {}: {e}", run_res.id))
            })?
            .with_timezone(&chrono::Utc);

        Ok(Self {
            id: run_res.id,
            workflow_id: run_res.workflow_id,
            name: run_res.name.unwrap_or_default(),
            display_title: run_res.display_title,
            head_branch: run_res.head_branch,
            status: run_res.status.unwrap_or_else(|| "unknown".to_string()),
            conclusion: run_res.conclusion,
            created_at,
        })
    }
}

#[async_trait]
impl GitHubApi for GitHubApiAdapter {
    #[tracing::instrument(name = "GitHubApiAdapter::list_workflows", skip(self))]
    async fn list_workflows(
        &self,
        repository: &RepositoryCoordinate,
    ) -> Result<Vec<Workflow>, GitHubApiError> {
        let mut workflows = Vec::new();
        let mut page = 1;
        loop {
            let url = format!(
                "{}/repos/{}/{}/actions/workflows?per_page={}&page={}",
                self.base_url, repository.owner, repository.name, PER_PAGE, page
            );
            let api_response: GitHubWorkflowsApiResponse = self.get_json(&url).await?;
            let returned = api_response.workflows.len();
            workflows.extend(api_response.workflows.into_iter().map(|w| Workflow {
                id: w.id,
                name: w.name,
                path: w.path,
            }));

            if !has_more(page, PER_PAGE, returned, api_response.total_count) {
                break;
            }
            page += 1;
        }

        Ok(workflows)
    }

    #[tracing::instrument(name = "GitHubApiAdapter::list_runs", skip(self))]
    async fn list_runs(
        &self,
        repository: &RepositoryCoordinate,
        workflow_id: Option<u64>,
        page: u32,
    ) -> Result<RunPage, GitHubApiError> {
        let scope = match workflow_id {
            Some(id) => format!("actions/workflows/{id}/runs"),
            None => "actions/runs".to_string(),
        };
        let url = format!(
            "{}/repos/{}/{}/{}?per_page={}&page={}",
            self.base_url, repository.owner, repository.name, scope, PER_PAGE, page
        );

        let api_response: GitHubWorkflowRunsApiResponse = self.get_json(&url).await?;
        let returned = api_response.workflow_runs.len();
        let runs = api_response
            .workflow_runs
            .into_iter()
            .map(WorkflowRun::try_from)
            .collect::<Result<Vec<WorkflowRun>, GitHubApiError>>()?; // Early return if an error occurs

        Ok(RunPage {
            runs,
            has_more: has_more(page, PER_PAGE, returned, api_response.total_count),
        })
    }

    #[tracing::instrument(name = "GitHubApiAdapter::delete_run", skip(self))]
    async fn delete_run(
        &self,
        repository: &RepositoryCoordinate,
        run_id: u64,
    ) -> Result<(), GitHubApiError> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs/{}",
            self.base_url, repository.owner, repository.name, run_id
        );
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }
}
