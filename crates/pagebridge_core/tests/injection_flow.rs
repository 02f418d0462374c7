use pagebridge_core::{
    preference_pair, CapabilityScope, DiagnosticKind, ExtensionContext,
    ExtensionResolver, InjectionMode, InjectionOrchestrator, MemoryEngineFactory,
    OrchestratorState, PageGlobals, ResolveError, StorageCapabilityProvider, TableResolver,
};
use serde_json::json;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

fn memory_provider() -> StorageCapabilityProvider {
    StorageCapabilityProvider::new(Arc::new(MemoryEngineFactory::new()))
}

/// Resolver that records, per extension, which capabilities were already
/// published when its own injection started.
#[derive(Clone, Default)]
struct ObservingResolver {
    observed: Rc<RefCell<BTreeMap<String, Vec<String>>>>,
}

impl ExtensionResolver for ObservingResolver {
    fn inject_to(
        &self,
        extension_id: &str,
        _mode: InjectionMode,
        context: &mut ExtensionContext,
        globals: &PageGlobals,
    ) -> Result<(), ResolveError> {
        self.observed
            .borrow_mut()
            .insert(extension_id.to_string(), globals.published_ids().to_vec());
        context.capability_mut().expose(
            "runtime.id",
            CapabilityScope::Content,
            json!(extension_id),
        );
        Ok(())
    }
}

/// Resolver that fails for one designated extension id.
struct FailingFor {
    bad_id: &'static str,
    inner: TableResolver,
}

impl ExtensionResolver for FailingFor {
    fn inject_to(
        &self,
        extension_id: &str,
        mode: InjectionMode,
        context: &mut ExtensionContext,
        globals: &PageGlobals,
    ) -> Result<(), ResolveError> {
        if extension_id == self.bad_id {
            return Err(ResolveError::Evaluation {
                extension_id: extension_id.to_string(),
                message: "script threw during evaluation".to_string(),
            });
        }
        self.inner.inject_to(extension_id, mode, context, globals)
    }
}

#[test]
fn publishes_one_capability_per_listed_extension() {
    let (slot, channel) = preference_pair();
    slot.publish(json!([
        { "extensionId": "ext.a" },
        { "extensionId": "ext.b" },
        { "extensionId": "ext.c" },
    ]));

    let mut resolver = TableResolver::new();
    resolver.register_standard("ext.a");
    resolver.register_standard("ext.b");
    resolver.register_standard("ext.c");

    let mut orchestrator = InjectionOrchestrator::new(channel, memory_provider(), resolver);
    let mut globals = PageGlobals::new();
    let report = orchestrator.environment_ready(&mut globals);

    assert_eq!(report.state, OrchestratorState::Ready);
    assert_eq!(report.injected, ["ext.a", "ext.b", "ext.c"]);
    assert_eq!(globals.capability_count(), 3);
    assert!(globals.storage_factory().is_some());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn injection_order_side_effects_are_observable_downstream() {
    let (slot, channel) = preference_pair();
    slot.publish(json!([
        { "extensionId": "ext.first" },
        { "extensionId": "ext.second" },
        { "extensionId": "ext.third" },
    ]));

    let resolver = ObservingResolver::default();
    let observed = Rc::clone(&resolver.observed);
    let mut orchestrator = InjectionOrchestrator::new(channel, memory_provider(), resolver);
    let mut globals = PageGlobals::new();
    orchestrator.environment_ready(&mut globals);

    let observed = observed.borrow();
    assert!(observed["ext.first"].is_empty());
    assert_eq!(observed["ext.second"], ["ext.first"]);
    assert_eq!(observed["ext.third"], ["ext.first", "ext.second"]);
    assert_eq!(globals.published_ids(), ["ext.first", "ext.second", "ext.third"]);
}

#[test]
fn one_failing_extension_does_not_abort_the_rest() {
    let (slot, channel) = preference_pair();
    slot.publish(json!([
        { "extensionId": "ext.x" },
        { "extensionId": "ext.bad" },
        { "extensionId": "ext.y" },
    ]));

    let mut inner = TableResolver::new();
    inner.register_standard("ext.x");
    inner.register_standard("ext.y");
    let resolver = FailingFor {
        bad_id: "ext.bad",
        inner,
    };

    let mut orchestrator = InjectionOrchestrator::new(channel, memory_provider(), resolver);
    let mut globals = PageGlobals::new();
    let report = orchestrator.environment_ready(&mut globals);

    assert_eq!(report.state, OrchestratorState::Ready);
    assert_eq!(report.injected, ["ext.x", "ext.y"]);
    assert!(globals.capability("ext.bad").is_none());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::ExtensionResolutionFailure
    );
    assert_eq!(report.diagnostics[0].extension_id.as_deref(), Some("ext.bad"));
}

#[test]
fn absent_channel_injects_nothing_without_error() {
    let (_slot, channel) = preference_pair();
    let mut orchestrator =
        InjectionOrchestrator::new(channel, memory_provider(), TableResolver::new());
    let mut globals = PageGlobals::new();

    let report = orchestrator.environment_ready(&mut globals);
    assert_eq!(report.state, OrchestratorState::Ready);
    assert!(!report.channel_present);
    assert_eq!(globals.capability_count(), 0);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn entry_without_extension_id_yields_one_diagnostic_and_no_injection() {
    let (slot, channel) = preference_pair();
    slot.publish(json!([{}]));

    let mut orchestrator =
        InjectionOrchestrator::new(channel, memory_provider(), TableResolver::new());
    let mut globals = PageGlobals::new();
    let report = orchestrator.environment_ready(&mut globals);

    assert_eq!(report.state, OrchestratorState::Ready);
    assert!(report.channel_present);
    assert!(report.injected.is_empty());
    assert_eq!(globals.capability_count(), 0);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::MalformedActivationEntry
    );
}

#[test]
fn empty_activation_list_installs_storage_and_nothing_else() {
    let (slot, channel) = preference_pair();
    slot.publish(json!([]));

    let mut orchestrator =
        InjectionOrchestrator::new(channel, memory_provider(), TableResolver::new());
    let mut globals = PageGlobals::new();
    let report = orchestrator.environment_ready(&mut globals);

    assert_eq!(report.state, OrchestratorState::Ready);
    assert!(report.channel_present);
    assert!(report.storage_installed);
    assert_eq!(globals.capability_count(), 0);
}

#[test]
fn duplicate_activation_entries_publish_a_single_capability() {
    let (slot, channel) = preference_pair();
    slot.publish(json!([
        { "extensionId": "ext.a" },
        { "extensionId": "ext.a", "background": true },
    ]));

    let mut resolver = TableResolver::new();
    resolver.register_standard("ext.a");
    let mut orchestrator = InjectionOrchestrator::new(channel, memory_provider(), resolver);
    let mut globals = PageGlobals::new();
    let report = orchestrator.environment_ready(&mut globals);

    // Both activations run, but the registry stays keyed by extension id.
    assert_eq!(report.injected, ["ext.a", "ext.a"]);
    assert_eq!(globals.capability_count(), 1);
    let capability = globals.capability("ext.a").expect("published");
    assert_eq!(capability.mode(), InjectionMode::Background);
}
