//! Page-global namespace with namespaced capability publication.
//!
//! # Responsibility
//! - Hold the per-page shared namespace written by bridge components and
//!   read by every script executing after injection.
//! - Key published capability objects by extension id, so a later
//!   injection can never silently overwrite an earlier extension's
//!   surface.
//!
//! # Invariants
//! - Only bridge components install bridge-owned top-level entries; host
//!   values go through [`PageGlobals::seed_host_global`].
//! - Publication order is preserved and observable.
//! - The whole namespace is discarded atomically at navigation; nothing
//!   survives into the next page load.

use crate::inject::capability::CapabilityObject;
use crate::storage::engine::StorageEngineFactory;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Fixed well-known global name for the storage factory.
pub const LOCAL_STORAGE_GLOBAL: &str = "LocalStorage";

/// Stable identifier for one page load; regenerated at each navigation.
pub type PageLoadId = Uuid;

/// One top-level value in the page-global namespace.
pub enum GlobalValue {
    /// Storage factory installed by the storage capability provider.
    StorageFactory(Arc<dyn StorageEngineFactory>),
    /// Value seeded by the hosting shell or the page itself.
    Host(Value),
}

impl Debug for GlobalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageFactory(_) => f.write_str("GlobalValue::StorageFactory"),
            Self::Host(value) => write!(f, "GlobalValue::Host({value})"),
        }
    }
}

/// Per-page shared namespace plus the capability registry.
#[derive(Debug)]
pub struct PageGlobals {
    page_load_id: PageLoadId,
    entries: BTreeMap<String, GlobalValue>,
    capabilities: BTreeMap<String, CapabilityObject>,
    published_order: Vec<String>,
}

impl PageGlobals {
    /// Creates a fresh namespace for one page load.
    pub fn new() -> Self {
        Self {
            page_load_id: Uuid::new_v4(),
            entries: BTreeMap::new(),
            capabilities: BTreeMap::new(),
            published_order: Vec::new(),
        }
    }

    pub fn page_load_id(&self) -> PageLoadId {
        self.page_load_id
    }

    /// Returns one named top-level entry.
    pub fn get(&self, name: &str) -> Option<&GlobalValue> {
        self.entries.get(name)
    }

    /// Seeds a host-owned value into the namespace.
    ///
    /// Used by the hosting shell before injection runs; the bridge never
    /// overwrites host values.
    pub fn seed_host_global(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), GlobalValue::Host(value));
    }

    /// Installs the storage factory under [`LOCAL_STORAGE_GLOBAL`].
    ///
    /// Intended for the storage capability provider only; occupancy rules
    /// live there.
    pub(crate) fn set_storage_factory(&mut self, factory: Arc<dyn StorageEngineFactory>) {
        self.entries.insert(
            LOCAL_STORAGE_GLOBAL.to_string(),
            GlobalValue::StorageFactory(factory),
        );
    }

    /// Returns the installed storage factory, if any.
    pub fn storage_factory(&self) -> Option<Arc<dyn StorageEngineFactory>> {
        match self.entries.get(LOCAL_STORAGE_GLOBAL) {
            Some(GlobalValue::StorageFactory(factory)) => Some(Arc::clone(factory)),
            _ => None,
        }
    }

    /// Publishes one extension's capability object into the registry.
    ///
    /// The registry is keyed by extension id, so distinct extensions never
    /// collide. Re-publication for the same id replaces the prior surface
    /// without disturbing publication order.
    pub(crate) fn publish_capability(&mut self, capability: CapabilityObject) {
        let extension_id = capability.extension_id().to_string();
        if self.capabilities.insert(extension_id.clone(), capability).is_none() {
            self.published_order.push(extension_id);
        }
    }

    /// Returns the published capability object for one extension.
    pub fn capability(&self, extension_id: &str) -> Option<&CapabilityObject> {
        self.capabilities.get(extension_id)
    }

    /// Number of extensions with a published capability object.
    pub fn capability_count(&self) -> usize {
        self.capabilities.len()
    }

    /// Extension ids in publication (injection) order.
    pub fn published_ids(&self) -> &[String] {
        &self.published_order
    }
}

impl Default for PageGlobals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobalValue, PageGlobals, LOCAL_STORAGE_GLOBAL};
    use crate::inject::capability::{CapabilityObject, InjectionMode};
    use crate::storage::engine::MemoryEngineFactory;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn fresh_namespaces_get_distinct_page_load_ids() {
        let first = PageGlobals::new();
        let second = PageGlobals::new();
        assert_ne!(first.page_load_id(), second.page_load_id());
    }

    #[test]
    fn capability_registry_is_keyed_by_extension_id() {
        let mut globals = PageGlobals::new();
        globals.publish_capability(CapabilityObject::new("ext.a", InjectionMode::Content));
        globals.publish_capability(CapabilityObject::new("ext.b", InjectionMode::Content));

        assert_eq!(globals.capability_count(), 2);
        assert!(globals.capability("ext.a").is_some());
        assert!(globals.capability("ext.b").is_some());
        assert_eq!(globals.published_ids(), ["ext.a", "ext.b"]);
    }

    #[test]
    fn republication_replaces_without_duplicating_order() {
        let mut globals = PageGlobals::new();
        globals.publish_capability(CapabilityObject::new("ext.a", InjectionMode::Content));
        globals.publish_capability(CapabilityObject::new("ext.a", InjectionMode::Background));

        assert_eq!(globals.capability_count(), 1);
        assert_eq!(globals.published_ids(), ["ext.a"]);
        let capability = globals.capability("ext.a").expect("published capability");
        assert_eq!(capability.mode(), InjectionMode::Background);
    }

    #[test]
    fn host_seeded_value_is_visible_under_its_name() {
        let mut globals = PageGlobals::new();
        globals.seed_host_global(LOCAL_STORAGE_GLOBAL, json!("occupied"));
        assert!(matches!(
            globals.get(LOCAL_STORAGE_GLOBAL),
            Some(GlobalValue::Host(_))
        ));
        assert!(globals.storage_factory().is_none());
    }

    #[test]
    fn storage_factory_slot_round_trips() {
        let mut globals = PageGlobals::new();
        globals.set_storage_factory(Arc::new(MemoryEngineFactory::new()));
        assert!(globals.storage_factory().is_some());
    }
}
