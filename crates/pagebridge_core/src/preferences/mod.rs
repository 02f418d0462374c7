//! Privileged-to-page preference handoff.
//!
//! # Responsibility
//! - Carry the per-page activation list from the privileged process into
//!   the page process.
//! - Decode the raw payload tolerantly; malformed entries are skipped,
//!   never fatal.
//!
//! # Invariants
//! - The boundary is one-directional: only the privileged handle writes.
//! - An unpopulated slot reads as "no extensions", not as an error.

pub mod activation;
pub mod channel;

pub use activation::{parse_activation_list, ActivationEntry, ActivationParse, ActivationParseError};
pub use channel::{preference_pair, PreferenceChannel, PreferenceSlot};
