// ABOUTME: Accumulator for non-fatal warnings raised while deploying or tearing down.
// ABOUTME: Best-effort steps and post-deploy probes report here instead of aborting.

/// Collects non-fatal warnings during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn package_index(message: impl Into<String>) -> Self {
        Self::new(WarningKind::PackageIndex, message)
    }

    pub fn key_permissions(message: impl Into<String>) -> Self {
        Self::new(WarningKind::KeyPermissions, message)
    }

    pub fn credential_fallback(message: impl Into<String>) -> Self {
        Self::new(WarningKind::CredentialFallback, message)
    }

    pub fn cleanup(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Cleanup, message)
    }

    pub fn probe(kind: WarningKind, message: impl Into<String>) -> Self {
        Self::new(kind, message)
    }

    pub fn ssh_disconnect(message: impl Into<String>) -> Self {
        Self::new(WarningKind::SshDisconnect, message)
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Package index refresh failed; installs proceed with the cached index.
    PackageIndex,
    /// Key file still grants group or other access after chmod.
    KeyPermissions,
    /// Repository host not recognised; generic credential embedding used.
    CredentialFallback,
    /// Adding the remote user to the docker group failed.
    GroupMembership,
    /// A teardown step failed; the resource may remain.
    Cleanup,
    /// Application port did not answer on the remote host.
    AppProbe,
    /// Port 80 did not answer on the remote host.
    ProxyProbe,
    /// Port 80 did not answer from the invoking machine.
    ExternalProbe,
    /// Failed to cleanly disconnect the SSH session.
    SshDisconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::package_index("apt-get update failed"));
        diag.warn(Warning::probe(WarningKind::ExternalProbe, "timed out"));
        diag.warn(Warning::probe(WarningKind::ExternalProbe, "refused"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 3);
        assert_eq!(diag.count(WarningKind::ExternalProbe), 2);
        assert_eq!(diag.count(WarningKind::Cleanup), 0);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(
            Warning::key_permissions("test").kind,
            WarningKind::KeyPermissions
        );
        assert_eq!(
            Warning::ssh_disconnect("test").kind,
            WarningKind::SshDisconnect
        );
        assert_eq!(Warning::cleanup("test").kind, WarningKind::Cleanup);
    }
}
