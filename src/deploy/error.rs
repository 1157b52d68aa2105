// ABOUTME: Fatal deployment failures, one variant per failure point.
// ABOUTME: Each variant owns a distinct process exit code.

use std::path::PathBuf;

/// Errors that abort the deployment pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The working copy path exists but cannot be used as a directory.
    #[error("cannot enter repository directory {path}: {reason}")]
    ChangeDirectory { path: PathBuf, reason: String },

    #[error("git fetch failed: {0}")]
    FetchFailed(String),

    #[error("git checkout of '{branch}' failed: {reason}")]
    CheckoutFailed { branch: String, reason: String },

    #[error("git pull of '{branch}' failed: {reason}")]
    PullFailed { branch: String, reason: String },

    #[error("git clone failed: {0}")]
    CloneFailed(String),

    #[error("no Dockerfile or compose file found in {0}")]
    MissingRecipe(PathBuf),

    #[error("SSH connection to {host} failed: {reason}")]
    SshConnectivity { host: String, reason: String },

    #[error("container engine installation failed: {0}")]
    EngineInstallFailed(String),

    #[error("compose tool installation failed: {0}")]
    ComposeInstallFailed(String),

    #[error("reverse proxy installation failed: {0}")]
    ProxyInstallFailed(String),

    #[error("failed to enable or start service {service}: {reason}")]
    ServiceStartFailed { service: String, reason: String },

    #[error("file transfer failed: {0}")]
    TransferFailed(String),

    #[error("compose deployment failed: {0}")]
    ComposeDeployFailed(String),

    #[error("container build/run failed: {0}")]
    BuildRunFailed(String),

    #[error("container {0} is not running")]
    ContainerNotRunning(String),

    #[error("failed to write proxy configuration: {0}")]
    ProxyConfigWriteFailed(String),

    #[error("proxy configuration test failed: {0}")]
    ProxySyntaxFailed(String),

    #[error("proxy reload failed: {0}")]
    ProxyReloadFailed(String),

    #[error("required tools not found on PATH: {}", .0.join(", "))]
    MissingTools(Vec<String>),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployErrorKind {
    ChangeDirectory,
    Fetch,
    Checkout,
    Pull,
    Clone,
    MissingRecipe,
    SshConnectivity,
    EngineInstall,
    ComposeInstall,
    ProxyInstall,
    ServiceStart,
    Transfer,
    ComposeDeploy,
    BuildRun,
    ContainerNotRunning,
    ProxyConfigWrite,
    ProxySyntax,
    ProxyReload,
    MissingTools,
}

impl DeployErrorKind {
    /// Process exit code for this failure point.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::ChangeDirectory => 2,
            Self::Fetch => 3,
            Self::Checkout => 4,
            Self::Pull => 5,
            Self::Clone => 6,
            Self::MissingRecipe => 7,
            Self::SshConnectivity => 8,
            Self::EngineInstall => 9,
            Self::ComposeInstall => 10,
            Self::ProxyInstall => 11,
            Self::ServiceStart => 12,
            Self::Transfer => 13,
            Self::ComposeDeploy => 14,
            Self::BuildRun => 15,
            Self::ContainerNotRunning => 16,
            Self::ProxyConfigWrite => 17,
            Self::ProxySyntax => 18,
            Self::ProxyReload => 19,
            Self::MissingTools => 20,
        }
    }
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            Self::ChangeDirectory { .. } => DeployErrorKind::ChangeDirectory,
            Self::FetchFailed(_) => DeployErrorKind::Fetch,
            Self::CheckoutFailed { .. } => DeployErrorKind::Checkout,
            Self::PullFailed { .. } => DeployErrorKind::Pull,
            Self::CloneFailed(_) => DeployErrorKind::Clone,
            Self::MissingRecipe(_) => DeployErrorKind::MissingRecipe,
            Self::SshConnectivity { .. } => DeployErrorKind::SshConnectivity,
            Self::EngineInstallFailed(_) => DeployErrorKind::EngineInstall,
            Self::ComposeInstallFailed(_) => DeployErrorKind::ComposeInstall,
            Self::ProxyInstallFailed(_) => DeployErrorKind::ProxyInstall,
            Self::ServiceStartFailed { .. } => DeployErrorKind::ServiceStart,
            Self::TransferFailed(_) => DeployErrorKind::Transfer,
            Self::ComposeDeployFailed(_) => DeployErrorKind::ComposeDeploy,
            Self::BuildRunFailed(_) => DeployErrorKind::BuildRun,
            Self::ContainerNotRunning(_) => DeployErrorKind::ContainerNotRunning,
            Self::ProxyConfigWriteFailed(_) => DeployErrorKind::ProxyConfigWrite,
            Self::ProxySyntaxFailed(_) => DeployErrorKind::ProxySyntax,
            Self::ProxyReloadFailed(_) => DeployErrorKind::ProxyReload,
            Self::MissingTools(_) => DeployErrorKind::MissingTools,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}
