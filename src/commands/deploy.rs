// ABOUTME: Deploy command: collect answers, connect, then drive the pipeline stage by stage.
// ABOUTME: Prints progress between stages and a summary with the collected warnings.

use super::connection::{connect_runner, disconnect};
use super::prompt;
use dockhand::config::{self, Config};
use dockhand::context::DeploymentContext;
use dockhand::deploy::{DeploymentReport, HttpProbe, Pipeline, resolve_home};
use dockhand::diagnostics::Diagnostics;
use dockhand::error::{Error, Result};
use dockhand::logging::LogGuard;
use dockhand::output::{DeploySummary, Output};
use dockhand::runner::SystemRunner;

pub async fn deploy(config: Config, output: &mut Output, log: &LogGuard) -> Result<()> {
    let defaults = config.defaults.clone();
    let token = config::token_from_env();
    let input = tokio::task::spawn_blocking(move || prompt::deploy_input(&defaults, token))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;

    output.start_timer();
    let mut ctx = DeploymentContext::new(input, config);
    tracing::info!(
        repo = %ctx.repo_url,
        branch = %ctx.branch,
        host = %ctx.remote().host,
        port = %ctx.app_port,
        "starting deployment of {}",
        ctx.repo_name()
    );

    let mut diag = Diagnostics::default();
    let runner = connect_runner(ctx.remote(), ctx.config(), output, &mut diag).await?;

    let result = match resolve_home(&runner, &mut ctx.target).await {
        Ok(()) => run_stages(&runner, &ctx, output).await,
        Err(e) => Err(e.into()),
    };
    disconnect(runner, &mut diag).await;
    let report = result?;

    let warnings: Vec<_> = diag
        .warnings()
        .iter()
        .chain(report.diagnostics.warnings())
        .collect();
    for warning in &warnings {
        output.warning(&warning.message);
    }

    let host = ctx.remote().host;
    output.summary(&DeploySummary {
        repository: ctx.repo_url.to_string(),
        branch: ctx.branch.to_string(),
        host: host.to_string(),
        recipe: report.recipe.to_string(),
        app_url: format!("http://{}:{}", host, ctx.app_port),
        proxy_url: format!("http://{}", host),
        log_file: log.path().display().to_string(),
        warnings: warnings.len(),
    });
    Ok(())
}

async fn run_stages(
    runner: &SystemRunner,
    ctx: &DeploymentContext,
    output: &Output,
) -> Result<DeploymentReport> {
    let pipeline = Pipeline::new(runner, ctx).check_connectivity().await?;

    output.progress(&format!("Syncing {} ({})...", ctx.repo_url, ctx.branch));
    let pipeline = pipeline.sync_repository().await?;
    output.progress(&format!("Build recipe: {}", pipeline.recipe()));

    output.progress("Preparing remote host...");
    let pipeline = pipeline.prepare_remote().await?;

    output.progress(&format!("Transferring files to {}...", ctx.remote_app_dir()));
    let pipeline = pipeline.transfer().await?;

    output.progress("Building and starting the application...");
    let pipeline = pipeline.release().await?;

    output.progress("Configuring nginx...");
    let pipeline = pipeline.configure_proxy().await?;

    output.progress("Validating deployment...");
    let pipeline = pipeline.validate(&HttpProbe::default()).await?;

    tracing::info!(outcome = "success", "deployment of {} complete", ctx.repo_name());
    Ok(pipeline.finish())
}
