// ABOUTME: SSH private key path validation.
// ABOUTME: Expands a leading tilde and checks the file exists, is regular and is readable.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyPathError {
    #[error("key file not found: {0}")]
    NotFound(PathBuf),

    #[error("key path is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("key file {path} is not readable: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath(PathBuf);

impl KeyPath {
    /// Expand `~` and validate the resulting path.
    pub fn resolve(raw: &str) -> Result<Self, KeyPathError> {
        let expanded = shellexpand::tilde(raw.trim()).into_owned();
        Self::check(Path::new(&expanded))
    }

    pub fn check(path: &Path) -> Result<Self, KeyPathError> {
        let metadata =
            std::fs::metadata(path).map_err(|_| KeyPathError::NotFound(path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(KeyPathError::NotAFile(path.to_path_buf()));
        }

        File::open(path).map_err(|source| KeyPathError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self(path.to_path_buf()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
