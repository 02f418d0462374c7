//! Read-only preference channel over privileged shared state.
//!
//! # Responsibility
//! - Give the page process a synchronous, non-blocking view of the
//!   activation payload published by the privileged process.
//!
//! # Invariants
//! - The page-side handle has no write capability.
//! - A read never blocks on I/O; it is an in-memory snapshot.
//! - An unpopulated slot reads as absent, never as an error.

use crate::preferences::activation::{parse_activation_list, ActivationParse};
use serde_json::Value;
use std::sync::{Arc, RwLock};

type SharedSlot = Arc<RwLock<Option<Value>>>;

/// Creates a connected slot/channel pair for one page.
///
/// The slot stays on the privileged side; the channel is handed to the
/// page process.
pub fn preference_pair() -> (PreferenceSlot, PreferenceChannel) {
    let shared: SharedSlot = Arc::new(RwLock::new(None));
    (
        PreferenceSlot {
            shared: Arc::clone(&shared),
        },
        PreferenceChannel { shared },
    )
}

/// Privileged-side write handle.
#[derive(Debug, Clone)]
pub struct PreferenceSlot {
    shared: SharedSlot,
}

impl PreferenceSlot {
    /// Publishes the activation payload for the page.
    pub fn publish(&self, payload: Value) {
        let mut guard = match self.shared.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(payload);
    }

    /// Clears the slot; subsequent reads see absent.
    pub fn clear(&self) {
        let mut guard = match self.shared.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}

/// Page-side read-only handle.
#[derive(Debug, Clone)]
pub struct PreferenceChannel {
    shared: SharedSlot,
}

impl PreferenceChannel {
    /// Returns a snapshot of the raw payload, or `None` when the
    /// privileged process has not populated the slot.
    pub fn raw_snapshot(&self) -> Option<Value> {
        let guard = match self.shared.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }

    /// Returns the decoded activation list, or `None` when absent.
    ///
    /// Malformed entries are carried in [`ActivationParse::skipped`];
    /// decoding itself never fails.
    pub fn activated_extensions(&self) -> Option<ActivationParse> {
        self.raw_snapshot()
            .map(|raw| parse_activation_list(&raw))
    }
}
