// ABOUTME: Entry point for the dockhand CLI application.
// ABOUTME: Parses arguments, sets up logging and runs the selected mode until done or interrupted.

mod cli;
mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use cli::Cli;
use dockhand::config::Config;
use dockhand::deploy::DeployError;
use dockhand::error::{EXIT_GENERIC, EXIT_SUCCESS, Error, Result};
use dockhand::logging;
use dockhand::output::{Output, OutputMode};
use dockhand::runner::missing_tools;
use std::process::ExitCode;
use std::time::Duration;

/// Local programs the deploy pipeline shells out to.
const REQUIRED_TOOLS: &[&str] = &["git", "ssh", "rsync"];

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::from(EXIT_SUCCESS),
                _ => ExitCode::from(EXIT_GENERIC),
            };
        }
    };

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            output.error(&format!("failed to start runtime: {e}"));
            return ExitCode::from(EXIT_GENERIC);
        }
    };

    let code = runtime.block_on(run(cli, &mut output));
    // A prompt may still be blocked on the terminal after an interrupt.
    runtime.shutdown_timeout(Duration::from_millis(100));
    ExitCode::from(code)
}

async fn run(cli: Cli, output: &mut Output) -> u8 {
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            return e.exit_code();
        }
    };

    let log = match logging::init(&config.log_dir, cli.verbose, cli.mode_name()) {
        Ok(guard) => guard,
        Err(e) => {
            output.error(&e.to_string());
            return e.exit_code();
        }
    };

    let result = tokio::select! {
        result = dispatch(&cli, config, output, &log) => result,
        signal = shutdown_signal() => {
            tracing::info!("received {}", signal);
            Err(Error::Interrupted)
        }
    };

    let code = match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!(target: logging::FILE_ONLY, "{}", e);
            output.error(&e.to_string());
            e.exit_code()
        }
    };
    tracing::info!(exit_code = code, "exiting");
    drop(log);
    code
}

async fn dispatch(
    cli: &Cli,
    config: Config,
    output: &mut Output,
    log: &logging::LogGuard,
) -> Result<()> {
    if cli.cleanup {
        return commands::cleanup(config, output).await;
    }

    let missing = missing_tools(REQUIRED_TOOLS);
    if !missing.is_empty() {
        return Err(DeployError::MissingTools(missing).into());
    }

    commands::deploy(config, output, log).await
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path),
        None => Config::discover(&std::env::current_dir()?),
    }
}

/// Ctrl+C, or never if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = ctrl_c() => "SIGINT",
            },
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {}", e);
                ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
        "Ctrl+C"
    }
}
