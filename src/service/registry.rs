//! Version registry
//!
//! Keeps the append-only log of service version reports for the lifetime
//! of the process.

use crate::Result;
use crate::storage::SqliteStore;
use crate::version::{self, ServiceVersions};

pub struct VersionRegistry {
    store: SqliteStore,
}

impl VersionRegistry {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Current version of every service in every environment.
    ///
    /// When a (name, env) pair was reported more than once, the most
    /// recently inserted report wins.
    pub fn list_services(&self) -> Result<ServiceVersions> {
        let reports = self.store.read(|txn| txn.list_versions())?;
        Ok(version::aggregate(reports))
    }

    /// Record an observation. Never overwrites earlier reports.
    pub fn report_version(&self, name: &str, env: &str, version: &str) -> Result<()> {
        let id = self
            .store
            .write(|txn| txn.insert_version(name, env, version))?;
        tracing::debug!("Version report {}: {}@{} = {}", id, name, env, version);
        Ok(())
    }

    /// Drop every version report, returning how many were removed
    pub fn clear_all(&self) -> Result<usize> {
        let removed = self.store.write(|txn| txn.clear_versions())?;
        tracing::info!("Cleared {} version reports", removed);
        Ok(removed)
    }
}
