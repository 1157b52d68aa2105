// ABOUTME: Login name on the deployment target.
// ABOUTME: Restricted to characters that are safe in paths and shell words.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteUserError {
    #[error("username cannot be empty")]
    Empty,

    #[error("username cannot start with '-'")]
    LeadingDash,

    #[error("invalid character in username: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteUser(String);

impl RemoteUser {
    pub fn parse(value: &str) -> Result<Self, RemoteUserError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RemoteUserError::Empty);
        }
        if value.starts_with('-') {
            return Err(RemoteUserError::LeadingDash);
        }
        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '-' | '.'))
        {
            return Err(RemoteUserError::InvalidChar(c));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "root"
    }
}

impl fmt::Display for RemoteUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
