// ABOUTME: Library root for dockhand - exposes every pipeline stage for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod context;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod output;
pub mod runner;
pub mod ssh;
pub mod types;
