// ABOUTME: Cleanup command: confirm, then tear down a previous deployment on the remote host.
// ABOUTME: Declining exits successfully without connecting or touching anything.

use super::connection::{connect_runner, disconnect};
use super::prompt;
use dockhand::config::Config;
use dockhand::context::AppTarget;
use dockhand::deploy::confirmed_teardown;
use dockhand::diagnostics::Diagnostics;
use dockhand::error::{Error, Result};
use dockhand::output::Output;

pub async fn cleanup(config: Config, output: &mut Output) -> Result<()> {
    let defaults = config.defaults.clone();
    let (repo_url, remote, confirmed) = tokio::task::spawn_blocking(move || {
        let (repo_url, remote) = prompt::cleanup_input(&defaults)?;
        let confirmed = prompt::confirm(&format!(
            "Remove {} (container, image, nginx site and files) from {}?",
            repo_url.repo_name(),
            remote.host
        ))?;
        Ok::<_, Error>((repo_url, remote, confirmed))
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))??;

    output.start_timer();
    let mut app = AppTarget::new(&repo_url, remote.clone(), config.clone());
    let mut connect_diag = Diagnostics::default();
    let mut diag = Diagnostics::default();

    let announce = format!("Removing {} from {}...", app.repo_name, app.remote.host);
    let (out, key_diag) = (&*output, &mut connect_diag);
    let outcome = confirmed_teardown(
        confirmed,
        &mut app,
        move || async move {
            out.progress(&announce);
            connect_runner(&remote, &config, out, key_diag).await
        },
        &mut diag,
    )
    .await?;

    let Some((runner, report)) = outcome else {
        output.success("Cleanup cancelled; nothing was changed.");
        return Ok(());
    };
    disconnect(runner, &mut diag).await;

    for warning in connect_diag.warnings().iter().chain(diag.warnings()) {
        output.warning(&warning.message);
    }
    if report.is_clean() {
        output.success(&format!("Removed {} from {}", app.repo_name, app.remote.host));
    } else {
        output.success(&format!(
            "Cleanup of {} finished with {} skipped step(s)",
            app.repo_name,
            report.failed().count()
        ));
    }
    Ok(())
}
