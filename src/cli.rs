// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: No flags means deploy; --cleanup switches to teardown mode.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dockhand")]
#[command(about = "Clone a repository, ship it to a host over SSH and serve it behind nginx")]
#[command(version)]
pub struct Cli {
    /// Remove a previous deployment from the remote host instead of deploying
    #[arg(long)]
    pub cleanup: bool,

    /// Configuration file (default: dockhand.yml in the current directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug output on the terminal
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn mode_name(&self) -> &'static str {
        if self.cleanup { "cleanup" } else { "deploy" }
    }
}
