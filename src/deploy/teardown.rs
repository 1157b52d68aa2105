// ABOUTME: Cleanup pipeline: remove everything a deploy created on the remote host.
// ABOUTME: Every step is attempted; failures are reported and never stop the teardown.

use super::recipe::COMPOSE_FILES;
use super::error::DeployError;
use super::pipeline::resolve_home;
use super::release::ComposeCommand;
use super::step::{probe, run_best_effort};
use crate::context::AppTarget;
use crate::diagnostics::{Diagnostics, Warning};
use crate::runner::shell::quote_path;
use crate::runner::{CommandRunner, Invocation};
use std::future::Future;

/// Outcome of each teardown step, in execution order.
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub steps: Vec<(String, bool)>,
}

impl TeardownReport {
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|(_, ok)| *ok)
    }
}

struct Teardown<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    report: TeardownReport,
}

impl<R: CommandRunner + ?Sized> Teardown<'_, R> {
    async fn step(&mut self, name: impl Into<String>, invocation: Invocation) {
        let ok = run_best_effort(self.runner, invocation).await;
        self.report.steps.push((name.into(), ok));
    }
}

/// Whether the remote application directory holds a compose file.
async fn has_compose_file<R>(runner: &R, app: &AppTarget) -> bool
where
    R: CommandRunner + ?Sized,
{
    let tests = COMPOSE_FILES
        .iter()
        .map(|name| format!("test -f {}", quote_path(&format!("{}/{}", app.remote_app_dir, name))))
        .collect::<Vec<_>>()
        .join(" || ");
    probe(runner, Invocation::remote_script(tests)).await
}

/// Remove the container or stack, images, proxy site and application directory.
pub async fn teardown<R>(
    runner: &R,
    app: &AppTarget,
    diagnostics: &mut Diagnostics,
) -> TeardownReport
where
    R: CommandRunner + ?Sized,
{
    let mut run = Teardown {
        runner,
        report: TeardownReport::default(),
    };
    let name = app.container_name();

    if has_compose_file(runner, app).await {
        // compose names the images it builds; `--rmi local` removes exactly those
        let compose = ComposeCommand::detect(runner, app).await;
        run.step(
            "compose down",
            compose.invocation(app).args(["down", "--rmi", "local"]),
        )
        .await;
    } else {
        run.step(
            format!("stop {name}"),
            app.privileged("docker").args(["stop", &name]),
        )
        .await;
        run.step(
            format!("remove {name}"),
            app.privileged("docker").args(["rm", &name]),
        )
        .await;
        for image in [app.image(), app.backup_image()] {
            run.step(
                format!("remove image {image}"),
                app.privileged("docker").args(["rmi", &image]),
            )
            .await;
        }
    }

    let enabled = app.site_enabled().to_string_lossy().into_owned();
    let available = app.site_available().to_string_lossy().into_owned();
    run.step(
        format!("remove {enabled}"),
        app.privileged("rm").args(["-f", &enabled]),
    )
    .await;
    run.step(
        format!("remove {available}"),
        app.privileged("rm").args(["-f", &available]),
    )
    .await;
    run.step(
        "reload nginx",
        app.privileged("systemctl").args(["reload", "nginx"]),
    )
    .await;

    run.step(
        format!("remove {}", app.remote_app_dir),
        app.privileged("rm").args(["-rf", &app.remote_app_dir]),
    )
    .await;

    let report = run.report;
    for step in report.failed() {
        diagnostics.warn(Warning::cleanup(format!(
            "cleanup step '{step}' failed; the resource may already be absent"
        )));
    }
    if report.is_clean() {
        tracing::info!(outcome = "success", "removed {} from {}", app.repo_name, app.remote.host);
    }
    report
}

/// Tear down only after an explicit yes.
///
/// A no returns before `connect` is called, so nothing on the host is touched.
/// On a yes the remote home is resolved first, so the directory removed is
/// the one a deploy created. The connected runner is handed back for the
/// caller to close.
pub async fn confirmed_teardown<R, E, F, Fut>(
    confirmed: bool,
    app: &mut AppTarget,
    connect: F,
    diagnostics: &mut Diagnostics,
) -> Result<Option<(R, TeardownReport)>, E>
where
    R: CommandRunner,
    E: From<DeployError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    if !confirmed {
        tracing::info!("cleanup of {} declined; nothing removed", app.repo_name);
        return Ok(None);
    }

    let runner = connect().await?;
    resolve_home(&runner, app).await?;
    let report = teardown(&runner, app, diagnostics).await;
    Ok(Some((runner, report)))
}
