// ABOUTME: Environment stage: make sure the container engine, compose tool and proxy exist remotely.
// ABOUTME: Each dependency is probed first and installed only when absent.

use super::error::DeployError;
use super::step::{probe, run_best_effort, run_step};
use crate::context::RemoteTarget;
use crate::diagnostics::{Diagnostics, Warning, WarningKind};
use crate::runner::{CommandRunner, Invocation};

/// What `ensure_installed` did for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyPresent,
    Installed,
}

/// A remote dependency: how to detect it and how to install it.
pub struct Dependency {
    pub name: &'static str,
    presence: String,
    install: String,
    /// Install goes through apt and needs a fresh package index.
    uses_apt: bool,
    fail: fn(String) -> DeployError,
}

impl Dependency {
    fn presence_check(&self) -> Invocation {
        Invocation::remote_script(self.presence.clone())
    }

    fn install_procedure(&self) -> Invocation {
        Invocation::remote_script(self.install.clone())
    }

    pub fn engine(sudo: &str) -> Self {
        Self {
            name: "docker",
            presence: "command -v docker".to_string(),
            install: format!(
                "curl -fsSL https://get.docker.com -o /tmp/get-docker.sh && {sudo}sh /tmp/get-docker.sh"
            ),
            uses_apt: false,
            fail: DeployError::EngineInstallFailed,
        }
    }

    pub fn compose(sudo: &str) -> Self {
        Self {
            name: "docker compose",
            presence: "docker compose version || docker-compose version".to_string(),
            install: format!(
                "{sudo}DEBIAN_FRONTEND=noninteractive apt-get install -y docker-compose-plugin || \
                 ({sudo}curl -fsSL \"https://github.com/docker/compose/releases/latest/download/docker-compose-$(uname -s)-$(uname -m)\" \
                 -o /usr/local/bin/docker-compose && {sudo}chmod +x /usr/local/bin/docker-compose)"
            ),
            uses_apt: true,
            fail: DeployError::ComposeInstallFailed,
        }
    }

    pub fn proxy(sudo: &str) -> Self {
        Self {
            name: "nginx",
            presence: "command -v nginx".to_string(),
            install: format!("{sudo}DEBIAN_FRONTEND=noninteractive apt-get install -y nginx"),
            uses_apt: true,
            fail: DeployError::ProxyInstallFailed,
        }
    }
}

/// Summary of the environment stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub engine: InstallOutcome,
    pub compose: InstallOutcome,
    pub proxy: InstallOutcome,
}

/// Runs presence checks and installs against one remote host.
pub struct Installer<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    remote: &'a RemoteTarget,
    index_refreshed: bool,
}

impl<'a, R: CommandRunner + ?Sized> Installer<'a, R> {
    pub fn new(runner: &'a R, remote: &'a RemoteTarget) -> Self {
        Self {
            runner,
            remote,
            index_refreshed: false,
        }
    }

    /// Install `dependency` unless its presence check already passes.
    pub async fn ensure_installed(
        &mut self,
        dependency: &Dependency,
        diagnostics: &mut Diagnostics,
    ) -> Result<InstallOutcome, DeployError> {
        if probe(self.runner, dependency.presence_check()).await {
            tracing::info!("{} already installed", dependency.name);
            return Ok(InstallOutcome::AlreadyPresent);
        }

        tracing::info!("installing {}", dependency.name);
        if dependency.uses_apt {
            self.refresh_index(diagnostics).await;
        }

        run_step(self.runner, dependency.install_procedure(), dependency.fail).await?;

        if !probe(self.runner, dependency.presence_check()).await {
            return Err((dependency.fail)(format!(
                "{} still missing after install",
                dependency.name
            )));
        }

        tracing::info!(outcome = "success", "{} installed", dependency.name);
        Ok(InstallOutcome::Installed)
    }

    /// Refresh the package index once per run. Failure is only a warning.
    async fn refresh_index(&mut self, diagnostics: &mut Diagnostics) {
        if self.index_refreshed {
            return;
        }
        self.index_refreshed = true;

        let update = self
            .remote
            .privileged("apt-get")
            .arg("update");
        if !run_best_effort(self.runner, update).await {
            diagnostics.warn(Warning::package_index(
                "package index refresh failed; installing from the cached index",
            ));
        }
    }

    async fn enable_service(&self, service: &str) -> Result<(), DeployError> {
        run_step(
            self.runner,
            self.remote
                .privileged("systemctl")
                .args(["enable", "--now", service]),
            |reason| DeployError::ServiceStartFailed {
                service: service.to_string(),
                reason,
            },
        )
        .await
        .map(|_| ())
    }
}

/// Prepare the remote host: engine, compose tool and reverse proxy.
pub async fn prepare_remote<R>(
    runner: &R,
    remote: &RemoteTarget,
    diagnostics: &mut Diagnostics,
) -> Result<EnvironmentReport, DeployError>
where
    R: CommandRunner + ?Sized,
{
    let sudo = remote.sudo();
    let mut installer = Installer::new(runner, remote);

    let engine = installer
        .ensure_installed(&Dependency::engine(sudo), diagnostics)
        .await?;
    let compose = installer
        .ensure_installed(&Dependency::compose(sudo), diagnostics)
        .await?;
    let proxy = installer
        .ensure_installed(&Dependency::proxy(sudo), diagnostics)
        .await?;

    installer.enable_service("docker").await?;
    installer.enable_service("nginx").await?;

    if !remote.user.is_root() {
        let usermod = remote
            .privileged("usermod")
            .args(["-aG", "docker", remote.user.as_str()]);
        if !run_best_effort(runner, usermod).await {
            diagnostics.warn(Warning::new(
                WarningKind::GroupMembership,
                format!("could not add {} to the docker group", remote.user),
            ));
        }
    }

    tracing::info!(outcome = "success", "remote environment ready");
    Ok(EnvironmentReport {
        engine,
        compose,
        proxy,
    })
}
