// ABOUTME: Application-wide error type and process exit-code mapping.
// ABOUTME: Deploy failures keep their stage code; everything else exits with 1.

use crate::deploy::DeployError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for success.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for generic failures and user cancellation.
pub const EXIT_GENERIC: u8 = 1;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("deployment interrupted; remote state may be partially applied")]
    Interrupted,

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Deploy(e) => e.exit_code(),
            _ => EXIT_GENERIC,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
