//! Extension context construction and capability publication.
//!
//! This module owns the per-extension half of the bridge: isolated
//! contexts, the capability facet model, the resolution seam and the
//! injector that drives them.

pub mod capability;
pub mod context;
pub mod injector;
pub mod resolver;

pub use capability::{
    is_valid_extension_id, CapabilityEntry, CapabilityObject, CapabilityScope, InjectionMode,
    CAPABILITY_FACET,
};
pub use context::ExtensionContext;
pub use injector::{ContextInjector, InjectError, InjectionOutcome};
pub use resolver::{CapabilityBlueprint, ExtensionResolver, ResolveError, TableResolver};
