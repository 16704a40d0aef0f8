//! Discovery of the token and repository when they are not passed explicitly.

use crate::domain::models::repository::{Credentials, InvalidRepository, RepositoryCoordinate};
use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("GitHub CLI (`gh`) is not installed; pass --token or set GITHUB_TOKEN")]
    GhNotInstalled,

    #[error("`gh auth token` failed ({0}); run `gh auth login` or pass --token")]
    GhNotAuthenticated(String),

    #[error("no git repository found at {}: {source}", .path.display())]
    OpenRepository { path: PathBuf, source: git2::Error },

    #[error("could not read git remotes: {0}")]
    ReadRemotes(#[source] git2::Error),

    #[error("no GitHub remote found for {}; pass --repo OWNER/NAME", .0.display())]
    NoGitHubRemote(PathBuf),

    #[error(transparent)]
    InvalidRepository(#[from] InvalidRepository),
}

/// Resolves the repository first, then the token, so a bad `--repo` fails
/// without invoking `gh`.
///
/// # Errors
///
/// See [`resolve_repository`] and [`resolve_token`].
pub fn resolve_credentials(
    token: Option<String>,
    repository: Option<&str>,
    dir: &Path,
) -> Result<Credentials, CredentialsError> {
    let repository = resolve_repository(repository, dir)?;
    let token = resolve_token(token)?;
    Ok(Credentials { token, repository })
}

/// Returns `explicit` if present, otherwise asks the GitHub CLI for its token.
///
/// # Errors
///
/// Fails when `gh` is missing or has no authenticated session.
pub fn resolve_token(explicit: Option<String>) -> Result<String, CredentialsError> {
    if let Some(token) = explicit.filter(|token| !token.trim().is_empty()) {
        return Ok(token.trim().to_string());
    }

    tracing::debug!("No token given, asking the GitHub CLI");
    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .map_err(|_| CredentialsError::GhNotInstalled)?;
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || token.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(CredentialsError::GhNotAuthenticated(if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        }));
    }
    Ok(token)
}

/// Returns `explicit` if present, otherwise reads the GitHub remote of the
/// git repository containing `dir`, including linked worktrees.
///
/// # Errors
///
/// Fails when the coordinate is malformed or no GitHub remote is configured.
pub fn resolve_repository(
    explicit: Option<&str>,
    dir: &Path,
) -> Result<RepositoryCoordinate, CredentialsError> {
    match explicit {
        Some(repository) => Ok(repository.parse()?),
        None => detect_repository(dir),
    }
}

fn detect_repository(dir: &Path) -> Result<RepositoryCoordinate, CredentialsError> {
    let repo = Repository::discover(dir).map_err(|source| CredentialsError::OpenRepository {
        path: dir.to_path_buf(),
        source,
    })?;

    let repository =
        github_remote(&repo)?.ok_or_else(|| CredentialsError::NoGitHubRemote(dir.to_path_buf()))?;
    tracing::debug!("Detected repository {} from git remotes", repository);
    Ok(repository)
}

/// Picks the `origin` remote if it points at GitHub, else the first GitHub remote.
fn github_remote(repo: &Repository) -> Result<Option<RepositoryCoordinate>, CredentialsError> {
    let origin = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().and_then(parse_remote_url));
    if origin.is_some() {
        return Ok(origin);
    }

    let names = repo.remotes().map_err(CredentialsError::ReadRemotes)?;
    Ok(names
        .iter()
        .flatten()
        .filter_map(|name| repo.find_remote(name).ok())
        .find_map(|remote| remote.url().and_then(parse_remote_url)))
}

/// Extracts `owner/name` from an https or ssh GitHub remote URL.
fn parse_remote_url(url: &str) -> Option<RepositoryCoordinate> {
    let (_, path) = url
        .split_once("github.com/")
        .or_else(|| url.split_once("github.com:"))?;
    path.parse().ok()
}
