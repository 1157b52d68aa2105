// ABOUTME: The single external-command primitive every deployment stage goes through.
// ABOUTME: Runs locally or over the SSH session and reports exit status plus captured output.

mod error;
mod invocation;
pub mod shell;
mod system;
mod tools;

pub use error::RunnerError;
pub use invocation::{Invocation, Target};
pub use system::SystemRunner;
pub use tools::{find_in_path, missing_tools};

use async_trait::async_trait;

/// Exit status and captured output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Short description of a failure: last stderr line, else the exit code.
    pub fn failure_summary(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("exit code {}", self.exit_code))
    }
}

impl From<crate::ssh::CommandOutput> for CommandOutput {
    fn from(output: crate::ssh::CommandOutput) -> Self {
        Self {
            exit_code: i32::try_from(output.exit_code).unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Executes [`Invocation`]s.
///
/// A nonzero exit is reported through [`CommandOutput::exit_code`], never as
/// an error; `Err` means the command could not be run at all.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError>;
}
