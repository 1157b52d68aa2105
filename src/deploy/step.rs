// ABOUTME: Helpers shared by every stage for running one command with a failure policy.
// ABOUTME: Critical steps map failures to a DeployError; best-effort steps only log.

use super::error::DeployError;
use crate::runner::{CommandOutput, CommandRunner, Invocation};

/// Run a critical-path command. Nonzero exit and spawn failures both map
/// through `fail`, so they carry the same exit code.
pub(crate) async fn run_step<R, F>(
    runner: &R,
    invocation: Invocation,
    fail: F,
) -> Result<CommandOutput, DeployError>
where
    R: CommandRunner + ?Sized,
    F: FnOnce(String) -> DeployError,
{
    match runner.run(&invocation).await {
        Ok(output) if output.success() => Ok(output),
        Ok(output) => Err(fail(output.failure_summary())),
        Err(e) => Err(fail(e.to_string())),
    }
}

/// Run an opportunistic command. Returns whether it succeeded.
pub(crate) async fn run_best_effort<R>(runner: &R, invocation: Invocation) -> bool
where
    R: CommandRunner + ?Sized,
{
    match runner.run(&invocation).await {
        Ok(output) if output.success() => true,
        Ok(output) => {
            tracing::info!("ignored failure of {}: {}", invocation, output.failure_summary());
            false
        }
        Err(e) => {
            tracing::info!("ignored failure of {}: {}", invocation, e);
            false
        }
    }
}

/// Run a presence check or probe. Any failure reads as "no".
pub(crate) async fn probe<R>(runner: &R, invocation: Invocation) -> bool
where
    R: CommandRunner + ?Sized,
{
    matches!(runner.run(&invocation).await, Ok(output) if output.success())
}
