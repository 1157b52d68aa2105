// ABOUTME: Optional dockhand.yml configuration: prompt defaults and pipeline tunables.
// ABOUTME: Discovered in the working directory; every field has a default.

mod restart_policy;

pub use restart_policy::RestartPolicy;

use crate::error::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "dockhand.yml";
pub const CONFIG_FILENAME_ALT: &str = "dockhand.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".dockhand/config.yml";

/// Environment variable that supplies the access token without a prompt.
pub const TOKEN_ENV: &str = "DOCKHAND_TOKEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub defaults: PromptDefaults,

    /// Directory that receives the local working copy.
    #[serde(default = "default_dir")]
    pub workspace: PathBuf,

    #[serde(default = "default_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,

    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    #[serde(default)]
    pub restart: RestartPolicy,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default = "default_true")]
    pub keep_backup_image: bool,
}

/// Pre-filled answers for the interactive prompts. Still validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptDefaults {
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub key: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// Propagate source-side deletions (`rsync --delete`).
    #[serde(default = "default_true")]
    pub mirror: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            exclude: default_excludes(),
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    #[serde(default = "default_sites_available")]
    pub sites_available: PathBuf,

    #[serde(default = "default_sites_enabled")]
    pub sites_enabled: PathBuf,

    /// Remove the distribution's `default` site when enabling ours.
    #[serde(default = "default_true")]
    pub disable_default: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            sites_available: default_sites_available(),
            sites_enabled: default_sites_enabled(),
            disable_default: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    #[serde(default)]
    pub credential_style: CredentialStyle,
}

/// How the access token is placed in the clone URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStyle {
    /// Pick by repository host.
    #[default]
    Auto,
    /// `https://<token>@host/...`
    Token,
    /// `https://oauth2:<token>@host/...`
    OAuth2,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_true() -> bool {
    true
}

fn default_excludes() -> Vec<String> {
    [".git", "*.log", "node_modules", "__pycache__", ".venv"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sites_available() -> PathBuf {
    PathBuf::from("/etc/nginx/sites-available")
}

fn default_sites_enabled() -> PathBuf {
    PathBuf::from("/etc/nginx/sites-enabled")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: PromptDefaults::default(),
            workspace: default_dir(),
            log_dir: default_dir(),
            settle_delay: default_settle_delay(),
            connect_timeout: default_connect_timeout(),
            restart: RestartPolicy::default(),
            sync: SyncConfig::default(),
            proxy: ProxyConfig::default(),
            git: GitConfig::default(),
            keep_backup_image: true,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults config.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.to_path_buf()))?;
        Self::from_yaml(&content).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the first config file found in `dir`, or defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Access token from [`TOKEN_ENV`], if set and non-empty.
pub fn token_from_env() -> Option<SecretString> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}
