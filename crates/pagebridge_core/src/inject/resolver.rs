//! Extension resolution seam.
//!
//! # Responsibility
//! - Define the single delegation point to the extension-resolution
//!   subsystem (manifests, permissions, script bundles).
//! - Ship a table-backed baseline resolver for probes and tests.
//!
//! # Invariants
//! - The resolver sees page globals read-only; publication stays with the
//!   injector.

use crate::inject::capability::{
    CapabilityScope, InjectionMode, CAP_RUNTIME_ID, CAP_RUNTIME_SEND_MESSAGE, CAP_STORAGE_LOCAL,
    CAP_TABS_QUERY, CAP_WEB_REQUEST,
};
use crate::inject::context::ExtensionContext;
use crate::page::globals::PageGlobals;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Resolution failure for one extension; never affects the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    UnknownExtension(String),
    Manifest {
        extension_id: String,
        message: String,
    },
    Evaluation {
        extension_id: String,
        message: String,
    },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownExtension(id) => write!(f, "no such extension: {id}"),
            Self::Manifest {
                extension_id,
                message,
            } => write!(f, "manifest resolution failed for {extension_id}: {message}"),
            Self::Evaluation {
                extension_id,
                message,
            } => write!(f, "script evaluation failed for {extension_id}: {message}"),
        }
    }
}

impl Error for ResolveError {}

/// Delegation contract to the extension-resolution subsystem.
///
/// The implementation populates `context` with the extension's capability
/// surface for the requested mode. `globals` is the read view of the
/// page namespace; earlier injections are already visible there.
pub trait ExtensionResolver {
    fn inject_to(
        &self,
        extension_id: &str,
        mode: InjectionMode,
        context: &mut ExtensionContext,
        globals: &PageGlobals,
    ) -> Result<(), ResolveError>;
}

/// Declared capability surface for one table-resolved extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityBlueprint {
    entries: Vec<(String, CapabilityScope, Value)>,
}

impl CapabilityBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one named entry on the blueprint.
    pub fn declare(
        mut self,
        name: impl Into<String>,
        scope: CapabilityScope,
        value: Value,
    ) -> Self {
        self.entries.push((name.into(), scope, value));
        self
    }

    /// Conventional surface: message passing, storage access and runtime
    /// introspection for content contexts; tab and request interception
    /// primitives for background contexts.
    pub fn standard(extension_id: &str) -> Self {
        Self::new()
            .declare(CAP_RUNTIME_ID, CapabilityScope::Content, json!(extension_id))
            .declare(
                CAP_RUNTIME_SEND_MESSAGE,
                CapabilityScope::Content,
                json!({ "channel": format!("{extension_id}.port") }),
            )
            .declare(
                CAP_STORAGE_LOCAL,
                CapabilityScope::Content,
                json!({ "namespace": extension_id }),
            )
            .declare(CAP_TABS_QUERY, CapabilityScope::BackgroundOnly, json!({}))
            .declare(CAP_WEB_REQUEST, CapabilityScope::BackgroundOnly, json!({}))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Baseline resolver over an in-memory blueprint table.
#[derive(Debug, Default)]
pub struct TableResolver {
    blueprints: BTreeMap<String, CapabilityBlueprint>,
}

impl TableResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one blueprint under its extension id.
    pub fn register(&mut self, extension_id: impl Into<String>, blueprint: CapabilityBlueprint) {
        self.blueprints.insert(extension_id.into(), blueprint);
    }

    /// Registers the standard blueprint for `extension_id`.
    pub fn register_standard(&mut self, extension_id: &str) {
        self.register(extension_id, CapabilityBlueprint::standard(extension_id));
    }

    /// Built-in probe resolver with one standard extension.
    pub fn probe_baseline() -> Self {
        let mut resolver = Self::new();
        resolver.register_standard("builtin.probe");
        resolver
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

impl ExtensionResolver for TableResolver {
    fn inject_to(
        &self,
        extension_id: &str,
        _mode: InjectionMode,
        context: &mut ExtensionContext,
        _globals: &PageGlobals,
    ) -> Result<(), ResolveError> {
        let blueprint = self
            .blueprints
            .get(extension_id)
            .ok_or_else(|| ResolveError::UnknownExtension(extension_id.to_string()))?;

        for (name, scope, value) in &blueprint.entries {
            context
                .capability_mut()
                .expose(name.clone(), *scope, value.clone());
        }
        Ok(())
    }
}
