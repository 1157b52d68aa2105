// ABOUTME: The deployment context threaded by reference through every stage.
// ABOUTME: Built once from validated input; names and paths are derived, never re-entered.

use crate::config::Config;
use crate::runner::Invocation;
use crate::runner::shell::quote_path;
use crate::ssh::SessionConfig;
use crate::types::{AppPort, Branch, KeyPath, RemoteUser, RepoName, RepoUrl, ServerAddr};
use secrecy::SecretString;
use std::path::{Path, PathBuf};

/// SSH identity and address of the deployment target.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub user: RemoteUser,
    pub host: ServerAddr,
    pub key: KeyPath,
    /// `$HOME` as reported by the host, once resolved.
    home: Option<String>,
}

impl RemoteTarget {
    pub fn new(user: RemoteUser, host: ServerAddr, key: KeyPath) -> Self {
        Self {
            user,
            host,
            key,
            home: None,
        }
    }

    /// The user's home directory: the resolved `$HOME`, else the
    /// conventional `/root` or `/home/<user>`.
    pub fn home_dir(&self) -> String {
        match &self.home {
            Some(home) => home.clone(),
            None if self.user.is_root() => "/root".to_string(),
            None => format!("/home/{}", self.user),
        }
    }

    /// Prefix for privileged commands: empty for root, `sudo ` otherwise.
    pub fn sudo(&self) -> &'static str {
        if self.user.is_root() { "" } else { "sudo " }
    }

    pub fn session_config(&self, config: &Config) -> SessionConfig {
        SessionConfig::new(
            self.host.to_string(),
            self.user.as_str(),
            self.key.as_path(),
        )
        .connect_timeout(config.connect_timeout)
    }

    /// A remote command that needs root, wrapped in `sudo` for other users.
    pub fn privileged(&self, program: &str) -> Invocation {
        if self.user.is_root() {
            Invocation::remote(program)
        } else {
            Invocation::remote("sudo").arg(program)
        }
    }

    /// Remote shell for rsync's `-e`, using the same identity as the session.
    pub fn rsync_shell(&self) -> String {
        format!(
            "ssh -i {} -o StrictHostKeyChecking=accept-new -o BatchMode=yes",
            quote_path(&self.key.to_string())
        )
    }

    /// `user@host:path` destination for rsync.
    pub fn destination(&self, path: &str) -> String {
        format!("{}@{}:{}", self.user, self.host, path)
    }
}

/// Everything that names the deployed application on the target host.
///
/// This is all teardown needs; a deploy wraps it with the source details.
#[derive(Debug, Clone)]
pub struct AppTarget {
    pub repo_name: RepoName,
    pub remote: RemoteTarget,
    pub remote_app_dir: String,
    pub config: Config,
}

impl AppTarget {
    pub fn new(repo_url: &RepoUrl, remote: RemoteTarget, config: Config) -> Self {
        let repo_name = repo_url.repo_name().clone();
        let remote_app_dir = app_dir(&remote, &repo_name);
        Self {
            repo_name,
            remote,
            remote_app_dir,
            config,
        }
    }

    /// Adopt the home directory reported by the host; the app directory follows it.
    pub fn set_home(&mut self, home: impl Into<String>) {
        self.remote.home = Some(home.into());
        self.remote_app_dir = app_dir(&self.remote, &self.repo_name);
    }

    pub fn container_name(&self) -> String {
        self.repo_name.container_name()
    }

    pub fn image(&self) -> String {
        self.repo_name.image_tag("latest")
    }

    pub fn backup_image(&self) -> String {
        self.repo_name.image_tag("previous")
    }

    pub fn site_available(&self) -> PathBuf {
        self.config.proxy.sites_available.join(self.repo_name.as_str())
    }

    pub fn site_enabled(&self) -> PathBuf {
        self.config.proxy.sites_enabled.join(self.repo_name.as_str())
    }

    pub fn sudo(&self) -> &'static str {
        self.remote.sudo()
    }

    pub fn privileged(&self, program: &str) -> Invocation {
        self.remote.privileged(program)
    }
}

fn app_dir(remote: &RemoteTarget, repo_name: &RepoName) -> String {
    format!("{}/{}", remote.home_dir().trim_end_matches('/'), repo_name)
}

/// Validated answers collected before a deploy.
pub struct DeployInput {
    pub repo_url: RepoUrl,
    pub access_token: SecretString,
    pub branch: Branch,
    pub remote: RemoteTarget,
    pub app_port: AppPort,
}

/// The single record read by every deploy stage.
pub struct DeploymentContext {
    pub repo_url: RepoUrl,
    /// Never logged; only ever handed to git inside a secret argument.
    pub access_token: SecretString,
    pub branch: Branch,
    pub app_port: AppPort,
    pub local_repo_dir: PathBuf,
    pub target: AppTarget,
}

impl DeploymentContext {
    pub fn new(input: DeployInput, config: Config) -> Self {
        let workspace = std::path::absolute(&config.workspace)
            .unwrap_or_else(|_| config.workspace.clone());
        let local_repo_dir = workspace.join(input.repo_url.repo_name().as_str());
        let target = AppTarget::new(&input.repo_url, input.remote, config);

        Self {
            repo_url: input.repo_url,
            access_token: input.access_token,
            branch: input.branch,
            app_port: input.app_port,
            local_repo_dir,
            target,
        }
    }

    pub fn repo_name(&self) -> &RepoName {
        &self.target.repo_name
    }

    pub fn remote(&self) -> &RemoteTarget {
        &self.target.remote
    }

    pub fn remote_app_dir(&self) -> &str {
        &self.target.remote_app_dir
    }

    pub fn local_repo_dir(&self) -> &Path {
        &self.local_repo_dir
    }

    pub fn config(&self) -> &Config {
        &self.target.config
    }
}

impl std::fmt::Debug for DeploymentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentContext")
            .field("repo_url", &self.repo_url.as_str())
            .field("branch", &self.branch)
            .field("app_port", &self.app_port)
            .field("local_repo_dir", &self.local_repo_dir)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
