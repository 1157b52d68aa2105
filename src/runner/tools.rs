// ABOUTME: Lookup of required local executables on PATH.
// ABOUTME: Used to fail fast before any prompt when a collaborator tool is absent.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Find an executable by name in the given `PATH` value.
pub fn find_in_path(tool: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

/// Names from `tools` that are not on the current `PATH`.
pub fn missing_tools(tools: &[&str]) -> Vec<String> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    tools
        .iter()
        .filter(|tool| find_in_path(tool, &path_var).is_none())
        .map(|tool| tool.to_string())
        .collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
