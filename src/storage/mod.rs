//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - advisories(id, type, message)
//! - versions(id, name, env, version), cleared on every start
//!
//! All access goes through a [`Txn`] scope handed out by [`SqliteStore`].

pub mod schema;
pub mod sqlite;
pub mod txn;

pub use sqlite::{DbStats, SqliteStore, MEMORY_DATABASE};
pub use txn::{Txn, TxnMode};
