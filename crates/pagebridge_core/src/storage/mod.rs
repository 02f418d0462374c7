//! Page-local key-value storage capability.
//!
//! # Responsibility
//! - Define the storage-engine seam exposed to injected extensions.
//! - Install the storage factory into page globals before any extension
//!   context is constructed.
//!
//! # Invariants
//! - Engine internals stay behind [`engine::StorageEngine`]; bridge code
//!   never depends on a concrete backend.
//! - Installation is idempotent; a foreign occupant of the well-known
//!   global name is an install failure, not a silent overwrite.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod engine;
pub mod provider;
pub mod sqlite;

pub type StorageResult<T> = Result<T, StorageError>;

/// Engine-level storage failure.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    InvalidNamespace(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidNamespace(value) => {
                write!(f, "storage namespace is invalid: {value}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidNamespace(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
