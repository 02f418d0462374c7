//! FFI use-case API for the hosting shell.
//!
//! # Responsibility
//! - Expose the bridge lifecycle (preferences, environment-ready signal,
//!   navigation) as stable, use-case-level functions.
//! - Keep error semantics simple for host integration.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Return values are UTF-8 strings with stable meaning; an empty string
//!   means success for command-style calls.

use pagebridge_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    preference_pair, MemoryEngineFactory, PageSession, PreferenceSlot, SqliteEngineFactory,
    StorageCapabilityProvider, TableResolver,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const STORE_DB_FILE_NAME: &str = "pagebridge_store.sqlite3";

struct BridgeRuntime {
    slot: PreferenceSlot,
    session: PageSession<TableResolver>,
}

static BRIDGE: OnceLock<Mutex<BridgeRuntime>> = OnceLock::new();

fn relock(mutex: &Mutex<BridgeRuntime>) -> MutexGuard<'_, BridgeRuntime> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn with_bridge(f: impl FnOnce(&mut BridgeRuntime) -> String) -> String {
    match BRIDGE.get() {
        Some(bridge) => f(&mut relock(bridge)),
        None => "error: bridge not initialized; call init_bridge first".to_string(),
    }
}

/// Minimal health-check API for host smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking, never throws.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes the bridge crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking, never throws.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes bridge logging once per page process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path for rolling log files.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`; conflicting
///   reconfiguration returns an error message.
/// - Never panics; empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Initializes the bridge runtime for this page process.
///
/// Input semantics:
/// - `storage_dir`: absolute directory for persistent extension storage;
///   empty selects a non-persistent in-memory store.
///
/// # FFI contract
/// - First call wins; later calls are no-ops returning success.
/// - Never panics; empty string on success, error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_bridge(storage_dir: String) -> String {
    if BRIDGE.get().is_some() {
        return String::new();
    }

    let provider = if storage_dir.trim().is_empty() {
        StorageCapabilityProvider::new(std::sync::Arc::new(MemoryEngineFactory::new()))
    } else {
        let dir = PathBuf::from(storage_dir.trim());
        if let Err(err) = std::fs::create_dir_all(&dir) {
            return format!("error: failed to create storage directory: {err}");
        }
        let db_path = dir.join(STORE_DB_FILE_NAME);
        match SqliteEngineFactory::open_at(&db_path) {
            Ok(factory) => StorageCapabilityProvider::new(std::sync::Arc::new(factory)),
            Err(err) => return format!("error: failed to open store db: {err}"),
        }
    };

    let (slot, channel) = preference_pair();
    let runtime = BridgeRuntime {
        slot,
        session: PageSession::new(channel, provider, TableResolver::new()),
    };
    let _ = BRIDGE.set(Mutex::new(runtime));
    log::info!(
        "event=bridge_init module=ffi status=ok persistent={}",
        !storage_dir.trim().is_empty()
    );
    String::new()
}

/// Registers one resolvable extension with the baseline resolver.
///
/// # FFI contract
/// - Identifier shape is validated; rejected ids return an error message.
/// - Never panics; empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn register_extension(extension_id: String) -> String {
    if !pagebridge_core::inject::is_valid_extension_id(extension_id.trim()) {
        return format!("error: invalid extension id: {extension_id}");
    }
    with_bridge(|runtime| {
        runtime
            .session
            .resolver_mut()
            .register_standard(extension_id.trim());
        String::new()
    })
}

/// Publishes the activation payload computed by the privileged process.
///
/// Input semantics:
/// - `payload_json`: JSON array of `{ "extensionId": ..., "background": ... }`.
///
/// # FFI contract
/// - Unparseable JSON returns an error message; nothing is published.
/// - Never panics; empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn publish_preferences(payload_json: String) -> String {
    let payload: serde_json::Value = match serde_json::from_str(&payload_json) {
        Ok(value) => value,
        Err(err) => return format!("error: invalid preference payload: {err}"),
    };
    with_bridge(|runtime| {
        runtime.slot.publish(payload);
        String::new()
    })
}

/// Signals that the page environment is ready for injection.
///
/// # FFI contract
/// - Runs the one-shot orchestration for the current page load.
/// - Returns a stable summary line:
///   `state=<s> injected=<n> diagnostics=<n>`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn environment_ready() -> String {
    with_bridge(|runtime| {
        let report = runtime.session.environment_ready();
        format!(
            "state={} injected={} diagnostics={}",
            report.state.as_str(),
            report.injected.len(),
            report.diagnostics.len()
        )
    })
}

/// Discards all injected state for a navigation.
///
/// # FFI contract
/// - Returns the new page-load id as a string.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn navigate() -> String {
    with_bridge(|runtime| runtime.session.navigate().to_string())
}

/// Returns the extension ids with a published capability object, as a
/// JSON array in injection order.
#[flutter_rust_bridge::frb(sync)]
pub fn published_extensions() -> String {
    with_bridge(|runtime| {
        serde_json::to_string(runtime.session.globals().published_ids())
            .unwrap_or_else(|err| format!("error: {err}"))
    })
}
