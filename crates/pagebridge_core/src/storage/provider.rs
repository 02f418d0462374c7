//! Storage capability provider.
//!
//! # Responsibility
//! - Install the storage factory into the page-global namespace under the
//!   fixed well-known name, before any extension context is constructed.
//!
//! # Invariants
//! - Re-installation into the same namespace is a no-op, never a
//!   duplicate.
//! - A foreign occupant of the well-known name fails the install instead
//!   of being overwritten.

use crate::page::globals::{GlobalValue, PageGlobals, LOCAL_STORAGE_GLOBAL};
use crate::storage::engine::StorageEngineFactory;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Outcome of one install call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

/// Install failure; fatal only to storage-dependent extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageInstallError {
    GlobalNameOccupied { name: String },
}

impl Display for StorageInstallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GlobalNameOccupied { name } => {
                write!(f, "global name already occupied by a foreign value: {name}")
            }
        }
    }
}

impl Error for StorageInstallError {}

/// Installs a page-local storage factory into page globals.
pub struct StorageCapabilityProvider {
    factory: Arc<dyn StorageEngineFactory>,
}

impl StorageCapabilityProvider {
    pub fn new(factory: Arc<dyn StorageEngineFactory>) -> Self {
        Self { factory }
    }

    /// Installs the factory under [`LOCAL_STORAGE_GLOBAL`].
    ///
    /// # Contract
    /// - Idempotent: a second call on the same namespace returns
    ///   [`InstallOutcome::AlreadyInstalled`] and changes nothing.
    /// - A host-seeded value under the well-known name is rejected with
    ///   [`StorageInstallError::GlobalNameOccupied`].
    pub fn install(
        &self,
        globals: &mut PageGlobals,
    ) -> Result<InstallOutcome, StorageInstallError> {
        match globals.get(LOCAL_STORAGE_GLOBAL) {
            Some(GlobalValue::StorageFactory(_)) => {
                info!(
                    "event=storage_install module=storage status=ok outcome=already_installed page_load={}",
                    globals.page_load_id()
                );
                Ok(InstallOutcome::AlreadyInstalled)
            }
            Some(GlobalValue::Host(_)) => {
                error!(
                    "event=storage_install module=storage status=error error_code=global_name_occupied name={} page_load={}",
                    LOCAL_STORAGE_GLOBAL,
                    globals.page_load_id()
                );
                Err(StorageInstallError::GlobalNameOccupied {
                    name: LOCAL_STORAGE_GLOBAL.to_string(),
                })
            }
            None => {
                globals.set_storage_factory(Arc::clone(&self.factory));
                info!(
                    "event=storage_install module=storage status=ok outcome=installed page_load={}",
                    globals.page_load_id()
                );
                Ok(InstallOutcome::Installed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InstallOutcome, StorageCapabilityProvider, StorageInstallError};
    use crate::page::globals::{PageGlobals, LOCAL_STORAGE_GLOBAL};
    use crate::storage::engine::MemoryEngineFactory;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn install_is_idempotent() {
        let provider = StorageCapabilityProvider::new(Arc::new(MemoryEngineFactory::new()));
        let mut globals = PageGlobals::new();

        assert_eq!(
            provider.install(&mut globals).expect("first install"),
            InstallOutcome::Installed
        );
        assert_eq!(
            provider.install(&mut globals).expect("second install"),
            InstallOutcome::AlreadyInstalled
        );
        assert!(globals.storage_factory().is_some());
    }

    #[test]
    fn foreign_occupant_fails_installation() {
        let provider = StorageCapabilityProvider::new(Arc::new(MemoryEngineFactory::new()));
        let mut globals = PageGlobals::new();
        globals.seed_host_global(LOCAL_STORAGE_GLOBAL, json!("page defined this"));

        let err = provider
            .install(&mut globals)
            .expect_err("occupied name must fail");
        assert!(matches!(err, StorageInstallError::GlobalNameOccupied { .. }));
        assert!(globals.storage_factory().is_none());
    }
}
