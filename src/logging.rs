// ABOUTME: Tracing setup: filtered terminal output plus an append-only log file per invocation.
// ABOUTME: The returned guard must outlive every log call so the file is flushed on exit.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Keeps the log writer alive; dropping it flushes the file.
pub struct LogGuard {
    _guard: WorkerGuard,
    path: PathBuf,
}

impl LogGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Events for the log file only; the terminal already shows them through `Output`.
pub const FILE_ONLY: &str = "dockhand::file_only";

/// Terminal filter: `RUST_LOG` if set, else `debug`/`warn`, never [`FILE_ONLY`].
fn terminal_directives(rust_log: Option<&str>, verbose: bool) -> String {
    let base = match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ if verbose => "debug",
        _ => "warn",
    };
    format!("{base},{FILE_ONLY}=off")
}

/// `dockhand_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    now.format("dockhand_%Y%m%d_%H%M%S.log").to_string()
}

/// Install the global subscriber and write the log header.
pub fn init(log_dir: &Path, verbose: bool, mode: &str) -> Result<LogGuard> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| Error::Logging(format!("{}: {}", log_dir.display(), e)))?;

    let file_name = log_file_name(chrono::Local::now());
    let path = log_dir.join(&file_name);
    let appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let terminal_filter = EnvFilter::new(terminal_directives(
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        verbose,
    ));

    let terminal = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_filter(terminal_filter);

    let file = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(terminal)
        .with(file)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    let host = gethostname::gethostname();
    tracing::info!(
        "dockhand {} ({} mode) invoked on {}",
        env!("CARGO_PKG_VERSION"),
        mode,
        host.to_string_lossy()
    );

    Ok(LogGuard {
        _guard: guard,
        path,
    })
}
