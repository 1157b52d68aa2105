// ABOUTME: Git branch name handling.
// ABOUTME: Empty input means "main"; names that git would read as options are refused.

use std::fmt;
use thiserror::Error;

pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BranchError {
    #[error("branch name cannot start with '-'")]
    LeadingDash,

    #[error("branch name cannot contain whitespace or control characters")]
    InvalidChar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch(String);

impl Branch {
    pub fn parse(value: &str) -> Result<Self, BranchError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Self::default());
        }

        if value.starts_with('-') {
            return Err(BranchError::LeadingDash);
        }

        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(BranchError::InvalidChar);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Branch {
    fn default() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
