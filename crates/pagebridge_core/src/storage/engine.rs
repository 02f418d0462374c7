//! Storage engine contracts and the in-memory reference engine.
//!
//! # Responsibility
//! - Define the engine trait pair consumed through the page-global
//!   storage factory.
//! - Provide an in-memory engine for hosts without persistence and for
//!   tests.
//!
//! # Invariants
//! - One factory returns the same logical store for the same namespace.
//! - Namespaces are validated before a store is handed out.

use crate::storage::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Page-local key-value store handed to extension code.
pub trait StorageEngine: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    fn clear(&self) -> StorageResult<()>;
    fn len(&self) -> StorageResult<usize>;
}

/// Factory installed into page globals under the well-known name.
///
/// `namespace` scopes one store per extension (or per page origin); the
/// caller never sees another namespace's keys.
pub trait StorageEngineFactory: Send + Sync {
    fn open(&self, namespace: &str) -> StorageResult<Arc<dyn StorageEngine>>;
}

pub(crate) fn validate_namespace(namespace: &str) -> StorageResult<&str> {
    let trimmed = namespace.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
    {
        return Err(StorageError::InvalidNamespace(namespace.to_string()));
    }
    Ok(trimmed)
}

// Lock helper shared by engines; a poisoned lock still yields the data.
pub(crate) fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Non-persistent engine backed by an in-process map.
#[derive(Debug, Default)]
pub struct MemoryStorageEngine {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorageEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryStorageEngine {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(relock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        relock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        relock(&self.values).remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        relock(&self.values).clear();
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(relock(&self.values).len())
    }
}

/// Factory yielding one shared in-memory store per namespace.
#[derive(Default)]
pub struct MemoryEngineFactory {
    stores: Mutex<BTreeMap<String, Arc<MemoryStorageEngine>>>,
}

impl MemoryEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngineFactory for MemoryEngineFactory {
    fn open(&self, namespace: &str) -> StorageResult<Arc<dyn StorageEngine>> {
        let namespace = validate_namespace(namespace)?;
        let mut stores = relock(&self.stores);
        let store = stores
            .entry(namespace.to_string())
            .or_insert_with(|| Arc::new(MemoryStorageEngine::new()));
        Ok(Arc::clone(store) as Arc<dyn StorageEngine>)
    }
}
