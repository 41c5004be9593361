//! Scoped transactions
//!
//! A [`Txn`] owns a pooled connection with an open transaction. It is
//! released in exactly one of three ways:
//! - [`Txn::finish`]: commit if read-write, roll back if read-only
//! - [`Txn::rollback`]: discard everything
//! - drop without either (early return, `?`, panic): roll back

use std::ops::Deref;

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::Result;

pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Access mode of a transaction scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnMode {
    /// Never persists anything, even if statements inside it write
    ReadOnly,
    /// Commits on normal exit
    ReadWrite,
}

impl TxnMode {
    pub fn is_read_write(&self) -> bool {
        matches!(self, TxnMode::ReadWrite)
    }

    /// Writers take the write lock up front so two writers cannot
    /// deadlock upgrading shared locks.
    fn begin_sql(&self) -> &'static str {
        match self {
            TxnMode::ReadOnly => "BEGIN DEFERRED",
            TxnMode::ReadWrite => "BEGIN IMMEDIATE",
        }
    }
}

/// An open transaction bound to one pooled connection
pub struct Txn {
    conn: DbConnection,
    mode: TxnMode,
}

impl Txn {
    pub(crate) fn begin(conn: DbConnection, mode: TxnMode) -> Result<Self> {
        conn.execute_batch(mode.begin_sql())?;
        Ok(Self { conn, mode })
    }

    /// Normal exit: commit a read-write scope, roll back a read-only one.
    ///
    /// If the commit itself fails the transaction is still open; it is
    /// rolled back when `self` drops.
    pub fn finish(self) -> Result<()> {
        let sql = if self.mode.is_read_write() { "COMMIT" } else { "ROLLBACK" };
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Abnormal exit: discard all writes made in this scope.
    pub fn rollback(self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Deref for Txn {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for Txn {
    fn drop(&mut self) {
        // autocommit is back on once COMMIT/ROLLBACK went through
        if self.conn.is_autocommit() {
            return;
        }
        tracing::debug!(mode = ?self.mode, "rolling back unfinished transaction");
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!("Failed to roll back transaction: {}", e);
        }
    }
}
