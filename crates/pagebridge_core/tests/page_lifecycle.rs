use pagebridge_core::{
    preference_pair, DiagnosticKind, MemoryEngineFactory, OrchestratorState, PageSession,
    StorageCapabilityProvider, TableResolver,
};
use serde_json::json;
use std::sync::Arc;

fn session_for(ids: &[&str]) -> (pagebridge_core::PreferenceSlot, PageSession<TableResolver>) {
    let (slot, channel) = preference_pair();
    let mut resolver = TableResolver::new();
    for id in ids {
        resolver.register_standard(id);
    }
    let provider = StorageCapabilityProvider::new(Arc::new(MemoryEngineFactory::new()));
    (slot, PageSession::new(channel, provider, resolver))
}

#[test]
fn session_runs_once_per_page_load() {
    let (slot, mut session) = session_for(&["ext.a"]);
    slot.publish(json!([{ "extensionId": "ext.a" }]));

    assert_eq!(session.state(), OrchestratorState::Uninitialized);
    let first = session.environment_ready();
    assert_eq!(first.state, OrchestratorState::Ready);
    assert_eq!(session.state(), OrchestratorState::Ready);

    let second = session.environment_ready();
    assert_eq!(second.diagnostics.len(), 1);
    assert_eq!(second.diagnostics[0].kind, DiagnosticKind::SignalIgnored);
    assert_eq!(session.globals().capability_count(), 1);
}

#[test]
fn navigation_invalidates_everything_atomically() {
    let (slot, mut session) = session_for(&["ext.a", "ext.b"]);
    slot.publish(json!([
        { "extensionId": "ext.a" },
        { "extensionId": "ext.b" },
    ]));

    session.environment_ready();
    assert_eq!(session.globals().capability_count(), 2);
    assert!(session.globals().storage_factory().is_some());

    session.navigate();
    assert_eq!(session.globals().capability_count(), 0);
    assert!(session.globals().storage_factory().is_none());
    assert!(session.globals().published_ids().is_empty());
}

#[test]
fn next_page_load_sees_the_latest_preference_snapshot() {
    let (slot, mut session) = session_for(&["ext.a", "ext.b"]);
    slot.publish(json!([{ "extensionId": "ext.a" }]));
    let first = session.environment_ready();
    assert_eq!(first.injected, ["ext.a"]);

    // Privileged side recomputes preferences for the next navigation.
    slot.publish(json!([{ "extensionId": "ext.b" }]));
    session.navigate();
    let second = session.environment_ready();

    assert_eq!(second.injected, ["ext.b"]);
    assert!(session.globals().capability("ext.a").is_none());
    assert!(session.globals().capability("ext.b").is_some());
}

#[test]
fn cleared_slot_reads_as_absent_on_the_next_load() {
    let (slot, mut session) = session_for(&["ext.a"]);
    slot.publish(json!([{ "extensionId": "ext.a" }]));
    session.environment_ready();

    slot.clear();
    session.navigate();
    let report = session.environment_ready();

    assert!(!report.channel_present);
    assert!(report.injected.is_empty());
    assert_eq!(report.state, OrchestratorState::Ready);
}
