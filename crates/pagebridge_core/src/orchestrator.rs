//! Injection orchestrator.
//!
//! # Responsibility
//! - Run the page initialization routine exactly once per page lifecycle,
//!   on the explicit environment-ready signal from the host.
//! - Order the run: storage install happens-before any injection;
//!   injections are sequential in activation order.
//!
//! # Invariants
//! - State moves Uninitialized -> Installing -> Ready, or -> Failed when
//!   the storage install fails; no other transition exists.
//! - A repeated signal is ignored with a diagnostic, never re-run.
//! - Per-extension failures are contained; the run always completes for
//!   the activation snapshot taken at start.

use crate::diag::{DiagnosticKind, InjectionDiagnostic};
use crate::inject::injector::ContextInjector;
use crate::inject::resolver::ExtensionResolver;
use crate::page::globals::PageGlobals;
use crate::preferences::channel::PreferenceChannel;
use crate::storage::provider::StorageCapabilityProvider;
use log::{info, warn};

/// Lifecycle state of the one-shot initialization routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Uninitialized,
    Installing,
    Ready,
    Failed,
}

impl OrchestratorState {
    /// Stable string form used in log events and host reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Installing => "installing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// Result of one environment-ready signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationReport {
    /// Terminal state after the signal was handled.
    pub state: OrchestratorState,
    /// Whether the activation slot was populated at snapshot time.
    pub channel_present: bool,
    /// Whether the storage capability ended up installed.
    pub storage_installed: bool,
    /// Extension ids injected during this run, in injection order.
    pub injected: Vec<String>,
    /// Contained failures observed during the run.
    pub diagnostics: Vec<InjectionDiagnostic>,
}

impl OrchestrationReport {
    fn for_state(state: OrchestratorState) -> Self {
        Self {
            state,
            channel_present: false,
            storage_installed: false,
            injected: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// One-shot initialization driver for a page lifecycle.
pub struct InjectionOrchestrator<R: ExtensionResolver> {
    state: OrchestratorState,
    channel: PreferenceChannel,
    storage: StorageCapabilityProvider,
    injector: ContextInjector<R>,
}

impl<R: ExtensionResolver> InjectionOrchestrator<R> {
    pub fn new(
        channel: PreferenceChannel,
        storage: StorageCapabilityProvider,
        resolver: R,
    ) -> Self {
        Self {
            state: OrchestratorState::Uninitialized,
            channel,
            storage,
            injector: ContextInjector::new(resolver),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn resolver(&self) -> &R {
        self.injector.resolver()
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        self.injector.resolver_mut()
    }

    /// Handles the environment-ready signal for the current page load.
    ///
    /// # Contract
    /// - First signal: installs storage, snapshots the activation list,
    ///   injects each well-formed entry in order, and reports.
    /// - Any later signal: no side effects, one `SignalIgnored`
    ///   diagnostic.
    /// - An absent or empty activation list is a normal no-op outcome.
    pub fn environment_ready(&mut self, globals: &mut PageGlobals) -> OrchestrationReport {
        if self.state != OrchestratorState::Uninitialized {
            warn!(
                "event=environment_ready module=orchestrator status=ignored state={} page_load={}",
                self.state.as_str(),
                globals.page_load_id()
            );
            let mut report = OrchestrationReport::for_state(self.state);
            report.diagnostics.push(InjectionDiagnostic::unscoped(
                DiagnosticKind::SignalIgnored,
                format!(
                    "environment-ready signal ignored in state {}",
                    self.state.as_str()
                ),
            ));
            return report;
        }

        self.state = OrchestratorState::Installing;
        info!(
            "event=environment_ready module=orchestrator status=start page_load={}",
            globals.page_load_id()
        );

        let mut report = OrchestrationReport::for_state(OrchestratorState::Installing);
        let storage_failed = match self.storage.install(globals) {
            Ok(_) => {
                report.storage_installed = true;
                false
            }
            Err(err) => {
                report.diagnostics.push(InjectionDiagnostic::unscoped(
                    DiagnosticKind::StorageInstallFailure,
                    err.to_string(),
                ));
                true
            }
        };

        // Snapshot once; later privileged writes do not affect this run.
        match self.channel.activated_extensions() {
            None => {
                info!(
                    "event=activation_snapshot module=orchestrator status=absent page_load={}",
                    globals.page_load_id()
                );
            }
            Some(parse) => {
                report.channel_present = true;
                for skipped in parse.skipped {
                    warn!(
                        "event=activation_snapshot module=orchestrator status=skipped_entry error={}",
                        skipped
                    );
                    report.diagnostics.push(InjectionDiagnostic::unscoped(
                        DiagnosticKind::MalformedActivationEntry,
                        skipped.to_string(),
                    ));
                }

                for entry in parse.entries {
                    match self.injector.inject(&entry, globals) {
                        Ok(outcome) => report.injected.push(outcome.extension_id),
                        Err(err) => {
                            report.diagnostics.push(InjectionDiagnostic::for_extension(
                                DiagnosticKind::ExtensionResolutionFailure,
                                entry.extension_id.clone(),
                                err.to_string(),
                            ));
                        }
                    }
                }
            }
        }

        self.state = if storage_failed {
            OrchestratorState::Failed
        } else {
            OrchestratorState::Ready
        };
        report.state = self.state;

        info!(
            "event=environment_ready module=orchestrator status=ok state={} injected={} diagnostics={} page_load={}",
            self.state.as_str(),
            report.injected.len(),
            report.diagnostics.len(),
            globals.page_load_id()
        );
        report
    }

    /// Returns the orchestrator to `Uninitialized` for the next page load.
    ///
    /// Must be paired with discarding the old [`PageGlobals`]; the page
    /// session owns that pairing.
    pub(crate) fn reset_for_navigation(&mut self) {
        self.state = OrchestratorState::Uninitialized;
    }
}
