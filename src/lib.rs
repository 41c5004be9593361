//! # Terminal - status dashboard
//!
//! Tracks operational advisories and the versions services run in each
//! environment, and serves both over a small HTTP API plus a dashboard page.
//!
//! Terminal provides:
//! - SQLite-backed storage with scoped transactions
//! - Advisory service with severity ordering
//! - Version registry that forgets everything on restart
//! - axum server exposing the services as JSON endpoints

pub mod advisory;
pub mod version;
pub mod storage;
pub mod service;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use advisory::{Advisory, AdvisoryType};
pub use version::{ServiceVersions, VersionReport};
pub use storage::SqliteStore;
pub use service::{AdvisoryService, VersionRegistry};

/// Result type alias for Terminal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Terminal operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid advisory type: {0}")]
    InvalidAdvisoryType(String),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Advisory not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors caused by bad caller input; these never touch storage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidAdvisoryType(_) | Error::MalformedIdentifier(_) | Error::NotFound(_)
        )
    }
}
