// ABOUTME: Command module aggregator for the dockhand CLI.
// ABOUTME: Re-exports the deploy and cleanup handlers.

mod cleanup;
mod connection;
mod deploy;
mod prompt;

pub use cleanup::cleanup;
pub use deploy::deploy;
