use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The `owner/name` coordinate of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCoordinate {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid repository `{0}`, expected OWNER/NAME")]
pub struct InvalidRepository(pub String);

impl FromStr for RepositoryCoordinate {
    type Err = InvalidRepository;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepositoryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A bearer token bound to the repository it is used against.
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub repository: RepositoryCoordinate,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .finish()
    }
}
