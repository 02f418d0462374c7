//! Renderer-side extension injection bridge.
//!
//! Receives per-extension activation data from the privileged process,
//! builds one isolated context per extension before any page script runs,
//! and publishes each extension's capability object into a namespaced
//! page-global registry.

pub mod diag;
pub mod inject;
pub mod logging;
pub mod orchestrator;
pub mod page;
pub mod preferences;
pub mod storage;

pub use diag::{DiagnosticKind, InjectionDiagnostic};
pub use inject::{
    CapabilityBlueprint, CapabilityObject, CapabilityScope, ContextInjector, ExtensionContext,
    ExtensionResolver, InjectError, InjectionMode, InjectionOutcome, ResolveError, TableResolver,
    CAPABILITY_FACET,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use orchestrator::{InjectionOrchestrator, OrchestrationReport, OrchestratorState};
pub use page::{PageGlobals, PageLoadId, PageSession, LOCAL_STORAGE_GLOBAL};
pub use preferences::{
    parse_activation_list, ActivationEntry, ActivationParse, ActivationParseError,
    preference_pair, PreferenceChannel, PreferenceSlot,
};
pub use storage::engine::{
    MemoryEngineFactory, MemoryStorageEngine, StorageEngine, StorageEngineFactory,
};
pub use storage::provider::{InstallOutcome, StorageCapabilityProvider, StorageInstallError};
pub use storage::sqlite::SqliteEngineFactory;
pub use storage::{StorageError, StorageResult};

/// Minimal health-check API for early host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the bridge crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
