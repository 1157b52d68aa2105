// ABOUTME: Command runner error types with SNAFU context selectors.
// ABOUTME: Only covers failures to execute at all; nonzero exits are not errors.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RunnerError {
    #[snafu(display("failed to start {program}: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("remote execution failed: {source}"))]
    Remote { source: crate::ssh::Error },

    #[snafu(display("no remote session available for: {command}"))]
    NoSession { command: String },
}
