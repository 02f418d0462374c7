//! Per-extension isolated execution context.
//!
//! # Responsibility
//! - Give each extension a private scope for resolver-internal state.
//! - Hold the capability facet until construction has fully succeeded.
//!
//! # Invariants
//! - Private scope is never published into page globals.
//! - The capability facet leaves the context only via
//!   [`ExtensionContext::into_capability`], after the resolver returned
//!   success.

use crate::inject::capability::{CapabilityObject, InjectionMode};
use serde_json::Value;
use std::collections::BTreeMap;

/// Freshly allocated namespace for one extension injection.
///
/// Two contexts never share scope; collisions between extensions (or with
/// the page's own globals) are impossible by construction.
#[derive(Debug)]
pub struct ExtensionContext {
    extension_id: String,
    mode: InjectionMode,
    scope: BTreeMap<String, Value>,
    capability: CapabilityObject,
}

impl ExtensionContext {
    /// Allocates an empty context for one extension and mode.
    pub fn new(extension_id: impl Into<String>, mode: InjectionMode) -> Self {
        let extension_id = extension_id.into();
        let capability = CapabilityObject::new(extension_id.clone(), mode);
        Self {
            extension_id,
            mode,
            scope: BTreeMap::new(),
            capability,
        }
    }

    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    pub fn mode(&self) -> InjectionMode {
        self.mode
    }

    /// Stores one resolver-private variable in the context scope.
    pub fn scope_set(&mut self, name: impl Into<String>, value: Value) {
        self.scope.insert(name.into(), value);
    }

    /// Reads one resolver-private variable from the context scope.
    pub fn scope_get(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    /// Number of private variables held by this context.
    pub fn scope_len(&self) -> usize {
        self.scope.len()
    }

    /// Mutable access to the capability facet for resolver population.
    pub fn capability_mut(&mut self) -> &mut CapabilityObject {
        &mut self.capability
    }

    /// Read access to the capability facet.
    pub fn capability(&self) -> &CapabilityObject {
        &self.capability
    }

    /// Consumes the context, discarding private scope and releasing the
    /// capability facet for publication.
    pub fn into_capability(self) -> CapabilityObject {
        self.capability
    }
}
