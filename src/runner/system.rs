// ABOUTME: Command runner backed by real processes and the SSH session.
// ABOUTME: Logs every invocation and its exit status to the audit log.

use super::error::{NoSessionSnafu, RemoteSnafu, RunnerError, SpawnSnafu};
use super::{CommandOutput, CommandRunner, Invocation, Target};
use crate::ssh::Session;
use async_trait::async_trait;
use snafu::{OptionExt, ResultExt};
use std::process::Stdio;
use tokio::process::Command;

/// Runs local commands as child processes and remote commands over SSH.
#[derive(Debug, Default)]
pub struct SystemRunner {
    session: Option<Session>,
}

impl SystemRunner {
    /// A runner that can only execute local commands.
    pub fn local() -> Self {
        Self { session: None }
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Close the SSH session, if any.
    pub async fn disconnect(self) -> Result<(), crate::ssh::Error> {
        match self.session {
            Some(session) => session.disconnect().await,
            None => Ok(()),
        }
    }

    async fn run_local(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.exposed_args())
            .envs(invocation.env_vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = invocation.working_dir() {
            command.current_dir(dir);
        }

        let output = command.output().await.context(SpawnSnafu {
            program: invocation.program(),
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn run_remote(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let session = self.session.as_ref().context(NoSessionSnafu {
            command: invocation.to_string(),
        })?;

        let output = session
            .exec(&invocation.remote_command_line())
            .await
            .context(RemoteSnafu)?;

        Ok(output.into())
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        tracing::info!(on = %invocation.target(), "run: {}", invocation);

        let result = match invocation.target() {
            Target::Local => self.run_local(invocation).await,
            Target::Remote => self.run_remote(invocation).await,
        };

        match &result {
            Ok(output) => {
                tracing::info!(exit_code = output.exit_code, "exit {}", output.exit_code);
                if !output.success() && !output.stderr.trim().is_empty() {
                    tracing::info!("stderr: {}", output.stderr.trim());
                }
            }
            Err(e) => tracing::warn!("could not run command: {}", e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_command_captures_output_and_status() {
        let runner = SystemRunner::local();
        let output = runner
            .run(&Invocation::local("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .await
            .unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failure_stderr_reaches_the_info_level_log() {
        use tracing_subscriber::filter::LevelFilter;
        use tracing_subscriber::prelude::*;

        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(move || sink.clone())
                .with_filter(LevelFilter::INFO),
        );
        let _default = tracing::subscriber::set_default(subscriber);

        SystemRunner::local()
            .run(&Invocation::local("sh").args(["-c", "echo 'no space left' >&2; exit 1"]))
            .await
            .unwrap();

        let log = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(log.contains("stderr: no space left"), "{log}");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let runner = SystemRunner::local();
        let result = runner
            .run(&Invocation::local("dockhand-no-such-program"))
            .await;
        assert!(matches!(result, Err(RunnerError::Spawn { .. })));
    }

    #[tokio::test]
    async fn remote_without_session_is_an_error() {
        let runner = SystemRunner::local();
        let result = runner.run(&Invocation::remote("true")).await;
        assert!(matches!(result, Err(RunnerError::NoSession { .. })));
    }
}
