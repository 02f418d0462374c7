//! Non-fatal diagnostic records for the injection pipeline.
//!
//! # Responsibility
//! - Carry per-step failure reports from orchestrator runs to callers.
//! - Keep diagnostic text stable enough for host-side display and logs.
//!
//! # Invariants
//! - A diagnostic never aborts a page load; it is a report, not a fault.
//! - `extension_id` is present exactly when the failure is scoped to one
//!   extension.

use std::fmt::{Display, Formatter};

/// Classification of one contained injection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Activation entry could not be decoded; the entry was skipped.
    MalformedActivationEntry,
    /// Resolver failed for one extension; other extensions unaffected.
    ExtensionResolutionFailure,
    /// Storage capability could not be installed into the page globals.
    StorageInstallFailure,
    /// Environment-ready signal arrived after the one-shot run consumed it.
    SignalIgnored,
}

impl DiagnosticKind {
    /// Stable code used in `event=` log lines and host reports.
    pub fn code(self) -> &'static str {
        match self {
            Self::MalformedActivationEntry => "malformed_activation_entry",
            Self::ExtensionResolutionFailure => "extension_resolution_failure",
            Self::StorageInstallFailure => "storage_install_failure",
            Self::SignalIgnored => "signal_ignored",
        }
    }
}

/// One contained failure observed during an orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionDiagnostic {
    pub kind: DiagnosticKind,
    /// Extension the failure is scoped to, when known.
    pub extension_id: Option<String>,
    /// Human-readable detail; already sanitized for single-line logging.
    pub message: String,
}

impl InjectionDiagnostic {
    /// Creates a diagnostic scoped to one extension.
    pub fn for_extension(
        kind: DiagnosticKind,
        extension_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            extension_id: Some(extension_id.into()),
            message: one_line(message.into()),
        }
    }

    /// Creates a diagnostic not tied to any one extension.
    pub fn unscoped(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            extension_id: None,
            message: one_line(message.into()),
        }
    }
}

impl Display for InjectionDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.extension_id {
            Some(id) => write!(f, "{}: [{id}] {}", self.kind.code(), self.message),
            None => write!(f, "{}: {}", self.kind.code(), self.message),
        }
    }
}

fn one_line(value: String) -> String {
    if value.contains(['\n', '\r']) {
        value.replace(['\n', '\r'], " ")
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticKind, InjectionDiagnostic};

    #[test]
    fn scoped_diagnostic_formats_with_extension_id() {
        let diag = InjectionDiagnostic::for_extension(
            DiagnosticKind::ExtensionResolutionFailure,
            "builtin.reader",
            "manifest missing",
        );
        let rendered = diag.to_string();
        assert!(rendered.contains("extension_resolution_failure"));
        assert!(rendered.contains("[builtin.reader]"));
    }

    #[test]
    fn unscoped_diagnostic_omits_extension_id() {
        let diag =
            InjectionDiagnostic::unscoped(DiagnosticKind::SignalIgnored, "already consumed");
        assert!(diag.extension_id.is_none());
        assert!(!diag.to_string().contains('['));
    }

    #[test]
    fn message_is_flattened_to_one_line() {
        let diag = InjectionDiagnostic::unscoped(
            DiagnosticKind::StorageInstallFailure,
            "first\nsecond\rthird",
        );
        assert!(!diag.message.contains('\n'));
        assert!(!diag.message.contains('\r'));
    }
}
