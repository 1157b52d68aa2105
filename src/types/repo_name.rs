// ABOUTME: Repository name derived from the last segment of a repository URL.
// ABOUTME: Names local and remote directories, the image tag and the container.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoNameError {
    #[error("repository name cannot be empty")]
    Empty,

    #[error("repository name cannot start with '.' or '-'")]
    BadStart,

    #[error("invalid character in repository name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName(String);

impl RepoName {
    pub fn new(value: &str) -> Result<Self, RepoNameError> {
        if value.is_empty() {
            return Err(RepoNameError::Empty);
        }

        if value.starts_with('.') || value.starts_with('-') {
            return Err(RepoNameError::BadStart);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(RepoNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Derive the name from a URL path: last non-empty segment, `.git` stripped.
    pub fn from_url_path(path: &str) -> Result<Self, RepoNameError> {
        let segment = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        let name = segment.strip_suffix(".git").unwrap_or(segment);
        Self::new(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image repository for this name. Image references must be lowercase.
    pub fn image(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// `<image>:<tag>`
    pub fn image_tag(&self, tag: &str) -> String {
        format!("{}:{}", self.image(), tag)
    }

    /// Deterministic container name for single-Dockerfile deployments.
    pub fn container_name(&self) -> String {
        format!("{}_app", self.0)
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
