// ABOUTME: Private key file permission handling.
// ABOUTME: Tightens the key to owner read/write before any transport uses it.

use super::error::{Error, Result};
use std::path::Path;

/// Set the key file to mode 0600 and confirm no group/other bits remain.
///
/// The chmod is best-effort (the file may belong to another user); the
/// verification is not, so a key that stays world-readable is reported.
#[cfg(unix)]
pub fn secure_key_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::warn!("could not chmod 600 {}: {}", path.display(), e);
    }

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::KeyTooOpen {
            path: path.to_path_buf(),
            mode,
        });
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn secure_key_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
