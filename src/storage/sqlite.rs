//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use super::schema;
use super::txn::{Txn, TxnMode};
use crate::advisory::{Advisory, AdvisoryType};
use crate::version::VersionReport;
use crate::{Error, Result};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Database path that selects a private in-memory store
pub const MEMORY_DATABASE: &str = ":memory:";

const POOL_SIZE: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed storage for advisories and version reports.
///
/// Cloning is cheap and every clone shares the same connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist).
    ///
    /// Opening runs startup initialization, which wipes all version reports.
    pub fn open(path: &Path) -> Result<Self> {
        if path.as_os_str() == MEMORY_DATABASE {
            return Self::open_in_memory();
        }

        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;

        // journal_mode can't change inside a transaction
        let conn = pool.get()?;
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        tracing::debug!("Opened {} (journal_mode={})", path.display(), journal_mode);
        drop(conn);

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing and throwaway deployments).
    ///
    /// Every connection to `:memory:` is a separate database, so the pool
    /// holds exactly one connection and never recycles it.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;
        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create both relations if absent and clear version reports.
    ///
    /// Advisories survive restarts; version reports never do.
    fn initialize_schema(&self) -> Result<()> {
        let cleared = self.write(|txn| {
            for stmt in schema::all_schema_statements() {
                txn.execute(stmt, [])?;
            }
            txn.clear_versions()
        })?;
        tracing::info!("Schema initialized, cleared {} version reports", cleared);
        Ok(())
    }

    // ========== Transaction Scopes ==========

    /// Open a transaction scope on a pooled connection.
    ///
    /// The caller must end it with [`Txn::finish`] or [`Txn::rollback`];
    /// dropping it rolls back.
    pub fn begin(&self, mode: TxnMode) -> Result<Txn> {
        let conn = self.pool.get()?;
        Txn::begin(conn, mode)
    }

    /// Run `f` inside a scope and release it on every path.
    ///
    /// On `Ok` the scope is finished per its mode; on `Err` it is rolled
    /// back before the error is returned.
    pub fn with_txn<T, F>(&self, mode: TxnMode, f: F) -> Result<T>
    where
        F: FnOnce(&Txn) -> Result<T>,
    {
        let txn = self.begin(mode)?;
        match f(&txn) {
            Ok(value) => {
                txn.finish()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback() {
                    tracing::warn!("Rollback failed after error '{}': {}", err, rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Read-only scope
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Txn) -> Result<T>,
    {
        self.with_txn(TxnMode::ReadOnly, f)
    }

    /// Read-write scope
    pub fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Txn) -> Result<T>,
    {
        self.with_txn(TxnMode::ReadWrite, f)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        self.read(|txn| {
            Ok(DbStats {
                advisories: txn.count_advisories()?,
                versions: txn.count_versions()?,
            })
        })
    }
}

impl Txn {
    // ========== Advisory Operations ==========

    /// Insert an advisory, returning the id storage assigned to it
    pub fn insert_advisory(&self, kind: AdvisoryType, message: &str) -> Result<i64> {
        self.execute(
            "INSERT INTO advisories (type, message) VALUES (?1, ?2)",
            params![kind.as_str(), message],
        )?;
        Ok(self.last_insert_rowid())
    }

    /// All advisories in insertion (id) order
    pub fn list_advisories(&self) -> Result<Vec<Advisory>> {
        let mut stmt = self.prepare("SELECT id, type, message FROM advisories ORDER BY id")?;

        let advisories = stmt
            .query_map([], row_to_advisory)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(advisories)
    }

    /// Delete an advisory by id, returning the number of rows removed
    pub fn delete_advisory(&self, id: i64) -> Result<usize> {
        let affected = self.execute("DELETE FROM advisories WHERE id = ?1", [id])?;
        Ok(affected)
    }

    /// Count advisories
    pub fn count_advisories(&self) -> Result<usize> {
        let count: i64 = self.query_row("SELECT COUNT(*) FROM advisories", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Version Operations ==========

    /// Append a version report
    pub fn insert_version(&self, name: &str, env: &str, version: &str) -> Result<i64> {
        self.execute(
            "INSERT INTO versions (name, env, version) VALUES (?1, ?2, ?3)",
            params![name, env, version],
        )?;
        Ok(self.last_insert_rowid())
    }

    /// All version reports in insertion (id) order
    pub fn list_versions(&self) -> Result<Vec<VersionReport>> {
        let mut stmt = self.prepare("SELECT id, name, env, version FROM versions ORDER BY id")?;

        let reports = stmt
            .query_map([], |row| {
                Ok(VersionReport {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    env: row.get(2)?,
                    version: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(reports)
    }

    /// Delete every version report, returning how many were removed
    pub fn clear_versions(&self) -> Result<usize> {
        let removed = self.execute("DELETE FROM versions", [])?;
        Ok(removed)
    }

    /// Count version reports
    pub fn count_versions(&self) -> Result<usize> {
        let count: i64 = self.query_row("SELECT COUNT(*) FROM versions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Helper to convert a row to an Advisory
fn row_to_advisory(row: &rusqlite::Row) -> rusqlite::Result<Advisory> {
    let kind_str: String = row.get(1)?;
    let kind: AdvisoryType = kind_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Advisory {
        id: row.get(0)?,
        kind,
        message: row.get(2)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbStats {
    pub advisories: usize,
    pub versions: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Advisories: {}", self.advisories)?;
        write!(f, "  Version reports: {}", self.versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_crud() {
        let store = SqliteStore::open_in_memory().unwrap();

        let id = store
            .write(|txn| txn.insert_advisory(AdvisoryType::Warning, "test warning"))
            .unwrap();
        assert_eq!(id, 1);

        let advisories = store.read(|txn| txn.list_advisories()).unwrap();
        assert_eq!(advisories, vec![Advisory::new(1, AdvisoryType::Warning, "test warning")]);

        let removed = store.write(|txn| txn.delete_advisory(id)).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.stats().unwrap().advisories, 0);
    }

    #[test]
    fn test_advisory_ids_are_not_reused() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = store
            .write(|txn| txn.insert_advisory(AdvisoryType::Info, "first"))
            .unwrap();
        store.write(|txn| txn.delete_advisory(first)).unwrap();
        let second = store
            .write(|txn| txn.insert_advisory(AdvisoryType::Info, "second"))
            .unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_schema_rejects_unknown_advisory_type() {
        let store = SqliteStore::open_in_memory().unwrap();

        let result = store.write(|txn| {
            txn.execute(
                "INSERT INTO advisories (type, message) VALUES ('critical', 'nope')",
                [],
            )?;
            Ok(())
        });

        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.stats().unwrap().advisories, 0);
    }

    #[test]
    fn test_versions_listed_in_insertion_order() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .write(|txn| {
                txn.insert_version("foo", "production", "1")?;
                txn.insert_version("foo", "production", "2")?;
                txn.insert_version("bar", "stage", "abc")?;
                Ok(())
            })
            .unwrap();

        let versions = store.read(|txn| txn.list_versions()).unwrap();
        let observed: Vec<&str> = versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(observed, vec!["1", "2", "abc"]);
    }

    #[test]
    fn test_clear_versions_keeps_advisories() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .write(|txn| {
                txn.insert_advisory(AdvisoryType::Alert, "keep me")?;
                txn.insert_version("foo", "production", "1")?;
                Ok(())
            })
            .unwrap();

        let removed = store.write(|txn| txn.clear_versions()).unwrap();
        assert_eq!(removed, 1);

        let stats = store.stats().unwrap();
        assert_eq!(stats, DbStats { advisories: 1, versions: 0 });
    }

    #[test]
    fn test_reopen_clears_versions_but_not_advisories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminal.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .write(|txn| {
                    txn.insert_advisory(AdvisoryType::Info, "survives restarts")?;
                    txn.insert_version("foo", "production", "1")?;
                    txn.insert_version("foo", "stage", "2")?;
                    Ok(())
                })
                .unwrap();
            assert_eq!(store.stats().unwrap(), DbStats { advisories: 1, versions: 2 });
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.stats().unwrap(), DbStats { advisories: 1, versions: 0 });

        let advisories = store.read(|txn| txn.list_advisories()).unwrap();
        assert_eq!(advisories[0].message, "survives restarts");
    }

    #[test]
    fn test_memory_path_opens_in_memory_store() {
        let store = SqliteStore::open(Path::new(MEMORY_DATABASE)).unwrap();
        assert_eq!(store.stats().unwrap(), DbStats { advisories: 0, versions: 0 });
    }

    #[test]
    fn test_concurrent_writers_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("terminal.db")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..10 {
                        store
                            .write(|txn| txn.insert_version("svc", "production", &format!("{worker}-{i}")))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.stats().unwrap().versions, 40);
    }
}
