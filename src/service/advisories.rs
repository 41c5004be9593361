//! Advisory service
//!
//! Validates input, then runs each operation in its own transaction scope.

use crate::advisory::{self, Advisory, AdvisoryType};
use crate::storage::SqliteStore;
use crate::{Error, Result};

pub struct AdvisoryService {
    store: SqliteStore,
}

impl AdvisoryService {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// All advisories, most severe first.
    ///
    /// Advisories of the same type come back in the order they were created.
    pub fn list_advisories(&self) -> Result<Vec<Advisory>> {
        let mut advisories = self.store.read(|txn| txn.list_advisories())?;
        advisory::sort_by_severity(&mut advisories);
        tracing::debug!("Listed {} advisories", advisories.len());
        Ok(advisories)
    }

    /// Create an advisory and return its id.
    ///
    /// `kind` must be one of `info`, `warning`, `alert`; anything else fails
    /// with [`Error::InvalidAdvisoryType`] before storage is touched.
    pub fn create_advisory(&self, kind: &str, message: &str) -> Result<i64> {
        let kind: AdvisoryType = kind.parse()?;
        let id = self.store.write(|txn| txn.insert_advisory(kind, message))?;
        tracing::info!("Created {} advisory {}", kind, id);
        Ok(id)
    }

    /// Delete an advisory given its id as raw request text.
    ///
    /// Fails with [`Error::MalformedIdentifier`] if `raw_id` is not an
    /// integer and [`Error::NotFound`] if no advisory has that id.
    pub fn delete_advisory(&self, raw_id: &str) -> Result<()> {
        let id = parse_id(raw_id)?;
        self.delete_advisory_by_id(id)
    }

    /// Delete an advisory by numeric id
    pub fn delete_advisory_by_id(&self, id: i64) -> Result<()> {
        // NotFound is raised inside the scope so nothing is committed
        self.store.write(|txn| match txn.delete_advisory(id)? {
            0 => Err(Error::NotFound(id)),
            _ => Ok(()),
        })?;
        tracing::info!("Deleted advisory {}", id);
        Ok(())
    }
}

/// Parse an advisory id; surrounding whitespace is ignored.
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::MalformedIdentifier(raw.to_string()))
}
