// ABOUTME: SSH client module for the deployment target.
// ABOUTME: Key-file authentication, known_hosts verification and remote command execution.

mod client;
mod error;
mod key;

pub use client::{CommandOutput, Session, SessionConfig};
pub use error::{Error, Result};
pub use key::secure_key_permissions;
