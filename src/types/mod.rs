// ABOUTME: Validated value types for user-supplied deployment input.
// ABOUTME: Each parser is a pure check; nothing downstream sees an unvalidated value.

mod app_port;
mod branch;
mod key_path;
mod remote_user;
mod repo_name;
mod repo_url;
mod server_addr;

pub use app_port::{AppPort, AppPortError};
pub use branch::{Branch, BranchError, DEFAULT_BRANCH};
pub use key_path::{KeyPath, KeyPathError};
pub use remote_user::{RemoteUser, RemoteUserError};
pub use repo_name::{RepoName, RepoNameError};
pub use repo_url::{RepoUrl, RepoUrlError};
pub use server_addr::{ServerAddr, ServerAddrError};
