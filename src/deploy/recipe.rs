// ABOUTME: Build recipe detection: a compose stack or a single Dockerfile.
// ABOUTME: Decided once from the working tree root and carried unchanged afterwards.

use super::error::DeployError;
use std::fmt;
use std::path::Path;

/// Compose file names, in the order they are looked for.
pub const COMPOSE_FILES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

pub const DOCKERFILE: &str = "Dockerfile";

/// How the application is built and run on the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    /// `docker build` + `docker run` of a single container.
    Dockerfile,
    /// `docker compose` stack. Wins when both recipes are present.
    Compose,
}

impl Recipe {
    /// Inspect the root of a working tree.
    pub fn detect(tree: &Path) -> Result<Self, DeployError> {
        if COMPOSE_FILES.iter().any(|name| tree.join(name).is_file()) {
            return Ok(Recipe::Compose);
        }
        if tree.join(DOCKERFILE).is_file() {
            return Ok(Recipe::Dockerfile);
        }
        Err(DeployError::MissingRecipe(tree.to_path_buf()))
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipe::Dockerfile => write!(f, "Dockerfile"),
            Recipe::Compose => write!(f, "compose"),
        }
    }
}
