// ABOUTME: Transfer stage: one-way rsync of the working copy to the remote application directory.
// ABOUTME: Excludes VCS metadata, logs and dependency caches; mirrors deletions when configured.

use super::error::DeployError;
use super::step::run_step;
use crate::context::DeploymentContext;
use crate::runner::{CommandRunner, Invocation};

/// Arguments for the local rsync invocation.
pub fn rsync_args(ctx: &DeploymentContext) -> Vec<String> {
    let sync = &ctx.config().sync;
    let mut args = vec!["-az".to_string()];
    if sync.mirror {
        args.push("--delete".to_string());
    }
    for pattern in &sync.exclude {
        args.push("--exclude".to_string());
        args.push(pattern.clone());
    }
    args.push("-e".to_string());
    args.push(ctx.remote().rsync_shell());
    // Trailing slashes: copy the tree's contents, not the directory itself.
    args.push(format!("{}/", ctx.local_repo_dir().display()));
    args.push(ctx.remote().destination(&format!("{}/", ctx.remote_app_dir())));
    args
}

/// Sync the working copy to `remote_app_dir`.
pub async fn sync_files<R>(runner: &R, ctx: &DeploymentContext) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    run_step(
        runner,
        Invocation::remote("mkdir").args(["-p", ctx.remote_app_dir()]),
        DeployError::TransferFailed,
    )
    .await?;

    run_step(
        runner,
        Invocation::local("rsync").args(rsync_args(ctx)),
        DeployError::TransferFailed,
    )
    .await?;

    tracing::info!(
        outcome = "success",
        "files synced to {}",
        ctx.remote().destination(ctx.remote_app_dir())
    );
    Ok(())
}
