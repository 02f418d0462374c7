//! Capability object model published for each injected extension.
//!
//! # Responsibility
//! - Define the externally visible facet an extension exposes to page
//!   scripts (conventionally named `lulumi`).
//! - Enforce the content/background exposure split on that facet.
//!
//! # Invariants
//! - Entry names are unique within one capability object.
//! - A content-mode object never carries background-only entries once it
//!   has gone through [`CapabilityObject::restricted`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known facet name used when the capability object is mirrored into
/// script-visible scope by the host runtime.
pub const CAPABILITY_FACET: &str = "lulumi";

/// Entry name for the message-passing primitive.
pub const CAP_RUNTIME_SEND_MESSAGE: &str = "runtime.sendMessage";
/// Entry name for runtime introspection (extension identity).
pub const CAP_RUNTIME_ID: &str = "runtime.id";
/// Entry name for extension-scoped storage access.
pub const CAP_STORAGE_LOCAL: &str = "storage.local";
/// Entry name for tab enumeration (background surface).
pub const CAP_TABS_QUERY: &str = "tabs.query";
/// Entry name for request interception (background surface).
pub const CAP_WEB_REQUEST: &str = "webRequest.onBeforeRequest";

static EXTENSION_ID_RE: Lazy<Regex> = Lazy::new(|| {
    // Lowercase dotted identifiers, e.g. `builtin.reader.mode`.
    Regex::new(r"^[a-z0-9][a-z0-9._-]{0,127}$").expect("extension id pattern is valid")
});

/// Returns whether `value` is an acceptable stable extension identifier.
pub fn is_valid_extension_id(value: &str) -> bool {
    EXTENSION_ID_RE.is_match(value)
}

/// Injection mode selected per activation entry.
///
/// Content contexts receive the restricted capability subset; background
/// contexts receive the full declared surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionMode {
    Content,
    Background,
}

impl InjectionMode {
    /// Stable string form used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Background => "background",
        }
    }
}

/// Visibility scope declared per capability entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityScope {
    /// Visible to both content and background contexts.
    Content,
    /// Visible only to background/service contexts.
    BackgroundOnly,
}

/// One named primitive on the capability facet.
///
/// The value is a descriptor defined by the resolver, not interpreted by
/// the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityEntry {
    pub scope: CapabilityScope,
    pub value: Value,
}

/// Externally visible facet published for one injected extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityObject {
    extension_id: String,
    mode: InjectionMode,
    entries: BTreeMap<String, CapabilityEntry>,
}

impl CapabilityObject {
    /// Creates an empty facet for one extension and injection mode.
    pub fn new(extension_id: impl Into<String>, mode: InjectionMode) -> Self {
        Self {
            extension_id: extension_id.into(),
            mode,
            entries: BTreeMap::new(),
        }
    }

    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    pub fn mode(&self) -> InjectionMode {
        self.mode
    }

    /// Adds or replaces one named entry on the facet.
    pub fn expose(&mut self, name: impl Into<String>, scope: CapabilityScope, value: Value) {
        self.entries
            .insert(name.into(), CapabilityEntry { scope, value });
    }

    /// Returns one entry by name.
    pub fn entry(&self, name: &str) -> Option<&CapabilityEntry> {
        self.entries.get(name)
    }

    /// Returns sorted entry names.
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies the exposure guard for the object's injection mode.
    ///
    /// # Contract
    /// - Background mode keeps the full declared surface.
    /// - Content mode withholds `BackgroundOnly` entries.
    /// - Returns the withheld entry names for reporting.
    pub fn restricted(mut self) -> (Self, Vec<String>) {
        if self.mode == InjectionMode::Background {
            return (self, Vec::new());
        }
        let withheld: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.scope == CapabilityScope::BackgroundOnly)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &withheld {
            self.entries.remove(name);
        }
        (self, withheld)
    }
}
