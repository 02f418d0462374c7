//! Page session: ties the namespace lifetime to navigation.
//!
//! # Responsibility
//! - Own one [`PageGlobals`] per page load and the orchestrator driving
//!   its initialization.
//! - Discard all injected state atomically at navigation and allow a
//!   fresh one-shot run.
//!
//! # Invariants
//! - Nothing published in one page load is observable after `navigate`.
//! - Every page load gets a distinct page-load id.

use crate::inject::resolver::ExtensionResolver;
use crate::orchestrator::{InjectionOrchestrator, OrchestrationReport, OrchestratorState};
use crate::page::globals::{PageGlobals, PageLoadId};
use crate::preferences::channel::PreferenceChannel;
use crate::storage::provider::StorageCapabilityProvider;
use log::info;

/// One page's lifecycle owner.
pub struct PageSession<R: ExtensionResolver> {
    globals: PageGlobals,
    orchestrator: InjectionOrchestrator<R>,
}

impl<R: ExtensionResolver> PageSession<R> {
    /// Creates a session for a fresh page load.
    pub fn new(
        channel: PreferenceChannel,
        storage: StorageCapabilityProvider,
        resolver: R,
    ) -> Self {
        Self {
            globals: PageGlobals::new(),
            orchestrator: InjectionOrchestrator::new(channel, storage, resolver),
        }
    }

    pub fn globals(&self) -> &PageGlobals {
        &self.globals
    }

    pub fn page_load_id(&self) -> PageLoadId {
        self.globals.page_load_id()
    }

    pub fn state(&self) -> OrchestratorState {
        self.orchestrator.state()
    }

    pub fn resolver(&self) -> &R {
        self.orchestrator.resolver()
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        self.orchestrator.resolver_mut()
    }

    /// Forwards the host's environment-ready signal to the orchestrator.
    pub fn environment_ready(&mut self) -> OrchestrationReport {
        self.orchestrator.environment_ready(&mut self.globals)
    }

    /// Navigates to a new page: discards the namespace wholesale and arms
    /// the orchestrator for the next environment-ready signal.
    pub fn navigate(&mut self) -> PageLoadId {
        let previous = self.globals.page_load_id();
        self.globals = PageGlobals::new();
        self.orchestrator.reset_for_navigation();
        info!(
            "event=navigation module=page status=ok previous_page_load={} page_load={}",
            previous,
            self.globals.page_load_id()
        );
        self.globals.page_load_id()
    }
}
