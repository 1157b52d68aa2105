// ABOUTME: Container lifecycle on the remote host: retire the old release, build and start the new one.
// ABOUTME: Branches on the build recipe; teardown of the previous release is best-effort.

use super::error::DeployError;
use super::recipe::Recipe;
use super::step::{probe, run_best_effort, run_step};
use crate::context::{AppTarget, DeploymentContext};
use crate::runner::{CommandRunner, Invocation};

/// Which compose front-end the host has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeCommand {
    /// `docker compose`
    Plugin,
    /// `docker-compose`
    Standalone,
}

impl ComposeCommand {
    pub async fn detect<R>(runner: &R, app: &AppTarget) -> Self
    where
        R: CommandRunner + ?Sized,
    {
        if probe(runner, app.privileged("docker").args(["compose", "version"])).await {
            ComposeCommand::Plugin
        } else {
            ComposeCommand::Standalone
        }
    }

    /// A compose invocation run from the application directory.
    pub fn invocation(self, app: &AppTarget) -> Invocation {
        let base = match self {
            ComposeCommand::Plugin => app.privileged("docker").arg("compose"),
            ComposeCommand::Standalone => app.privileged("docker-compose"),
        };
        base.current_dir(&app.remote_app_dir)
    }
}

/// Whether a container with exactly this name exists, running or not.
pub async fn container_exists<R>(runner: &R, app: &AppTarget, name: &str) -> bool
where
    R: CommandRunner + ?Sized,
{
    let list = app.privileged("docker").args([
        "ps",
        "-a",
        "--filter",
        &format!("name=^{name}$"),
        "--format",
        "{{.Names}}",
    ]);
    match runner.run(&list).await {
        Ok(output) if output.success() => output.stdout.lines().any(|line| line.trim() == name),
        _ => false,
    }
}

/// Stop and remove the named container if present. Best-effort.
pub async fn remove_container<R>(runner: &R, app: &AppTarget) -> bool
where
    R: CommandRunner + ?Sized,
{
    let name = app.container_name();
    if !container_exists(runner, app, &name).await {
        tracing::debug!("no existing container {}", name);
        return true;
    }

    tracing::info!("stopping existing container {}", name);
    let stopped = run_best_effort(runner, app.privileged("docker").args(["stop", &name])).await;
    let removed = run_best_effort(runner, app.privileged("docker").args(["rm", &name])).await;
    stopped && removed
}

/// Build and start the new release, then wait for it to settle.
pub async fn deploy<R>(
    runner: &R,
    ctx: &DeploymentContext,
    recipe: Recipe,
) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    let app = &ctx.target;

    match recipe {
        Recipe::Compose => deploy_compose(runner, app).await?,
        Recipe::Dockerfile => deploy_container(runner, ctx).await?,
    }

    let delay = app.config.settle_delay;
    if !delay.is_zero() {
        tracing::info!("waiting {:?} for the application to start", delay);
        tokio::time::sleep(delay).await;
    }
    Ok(())
}

async fn deploy_compose<R>(runner: &R, app: &AppTarget) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    let compose = ComposeCommand::detect(runner, app).await;

    remove_container(runner, app).await;
    run_best_effort(runner, compose.invocation(app).arg("down")).await;

    run_step(
        runner,
        compose.invocation(app).arg("build"),
        DeployError::ComposeDeployFailed,
    )
    .await?;
    run_step(
        runner,
        compose.invocation(app).args(["up", "-d"]),
        DeployError::ComposeDeployFailed,
    )
    .await?;

    tracing::info!(outcome = "success", "compose stack started");
    Ok(())
}

async fn deploy_container<R>(runner: &R, ctx: &DeploymentContext) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    let app = &ctx.target;
    let image = app.image();
    let name = app.container_name();
    let port = ctx.app_port.get();

    remove_container(runner, app).await;

    if app.config.keep_backup_image {
        run_best_effort(
            runner,
            app.privileged("docker")
                .args(["tag", &image, &app.backup_image()]),
        )
        .await;
    }

    run_step(
        runner,
        app.privileged("docker")
            .args(["build", "-t", &image, "."])
            .current_dir(&app.remote_app_dir),
        DeployError::BuildRunFailed,
    )
    .await?;

    let restart = app.config.restart.to_string();
    run_step(
        runner,
        app.privileged("docker").args([
            "run",
            "-d",
            "--name",
            &name,
            "-p",
            &format!("{port}:{port}"),
            "--restart",
            &restart,
            &image,
        ]),
        DeployError::BuildRunFailed,
    )
    .await?;

    run_best_effort(
        runner,
        app.privileged("docker").args(["image", "prune", "-f"]),
    )
    .await;

    tracing::info!(outcome = "success", "container {} started from {}", name, image);
    Ok(())
}
