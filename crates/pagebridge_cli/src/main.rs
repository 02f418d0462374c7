//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pagebridge_core` linkage.
//! - Run one deterministic dry injection for quick local sanity checks.

use pagebridge_core::{
    preference_pair, MemoryEngineFactory, PageSession, StorageCapabilityProvider, TableResolver,
};
use serde_json::json;
use std::sync::Arc;

fn main() {
    println!("pagebridge_core ping={}", pagebridge_core::ping());
    println!("pagebridge_core version={}", pagebridge_core::core_version());

    // Dry run: two probe extensions, one malformed entry.
    let (slot, channel) = preference_pair();
    slot.publish(json!([
        { "extensionId": "builtin.probe" },
        {},
        { "extensionId": "builtin.probe.background", "background": true },
    ]));

    let mut resolver = TableResolver::probe_baseline();
    resolver.register_standard("builtin.probe.background");
    let provider = StorageCapabilityProvider::new(Arc::new(MemoryEngineFactory::new()));
    let mut session = PageSession::new(channel, provider, resolver);

    let report = session.environment_ready();
    println!("state={}", report.state.as_str());
    println!("storage_installed={}", report.storage_installed);
    for id in &report.injected {
        println!("injected={id}");
    }
    for diagnostic in &report.diagnostics {
        println!("diagnostic={diagnostic}");
    }
}
