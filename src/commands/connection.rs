// ABOUTME: Shared helper for opening the SSH-backed command runner.
// ABOUTME: Tightens the key file, connects within the timeout and maps failures to exit code 8.

use dockhand::config::Config;
use dockhand::context::RemoteTarget;
use dockhand::deploy::DeployError;
use dockhand::diagnostics::{Diagnostics, Warning};
use dockhand::error::Result;
use dockhand::output::Output;
use dockhand::runner::SystemRunner;
use dockhand::ssh::{self, Session};

/// Open a runner that executes remote commands on `remote`.
pub async fn connect_runner(
    remote: &RemoteTarget,
    config: &Config,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<SystemRunner> {
    match ssh::secure_key_permissions(remote.key.as_path()) {
        Ok(()) => {}
        Err(e @ ssh::Error::KeyTooOpen { .. }) => diag.warn(Warning::key_permissions(e.to_string())),
        Err(e) => diag.warn(Warning::key_permissions(format!(
            "could not check key permissions: {e}"
        ))),
    }

    output.progress(&format!("Connecting to {}@{}...", remote.user, remote.host));
    let session = Session::connect(remote.session_config(config))
        .await
        .map_err(|e| DeployError::SshConnectivity {
            host: remote.host.to_string(),
            reason: e.to_string(),
        })?;

    Ok(SystemRunner::with_session(session))
}

/// Close the session; a failure here is only a warning.
pub async fn disconnect(runner: SystemRunner, diag: &mut Diagnostics) {
    if let Err(e) = runner.disconnect().await {
        diag.warn(Warning::ssh_disconnect(format!("SSH disconnect failed: {e}")));
    }
}
