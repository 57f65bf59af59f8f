//! Error types for the store subsystem.
//!
//! [`StoreError`] is returned by every store operation: pool checkout,
//! statements inside a unit of work, migrations and commit.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error (store unavailable).
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// The owning request was cancelled before the unit of work committed.
    #[error("unit of work cancelled")]
    Cancelled,
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
