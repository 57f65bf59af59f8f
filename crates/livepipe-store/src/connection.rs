//! `SQLite` connection pool with WAL mode and foreign keys enabled.
//!
//! Uses `r2d2` connection pooling with `r2d2_sqlite` backend. The pool is
//! created once by the binary and injected wherever a
//! [`ConnectionProvider`] is needed; nothing looks it up globally.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Source of transactional connections. One connection is checked out per
/// unit of work and held until it commits or rolls back.
pub trait ConnectionProvider: Send + Sync {
    /// Check out a connection, failing with [`crate::StoreError::Pool`] when the
    /// store is unavailable.
    fn acquire(&self) -> Result<PooledConnection>;
}

impl ConnectionProvider for ConnectionPool {
    fn acquire(&self) -> Result<PooledConnection> {
        Ok(self.get()?)
    }
}

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 16).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 30000).
    pub busy_timeout_ms: u32,
    /// How long a checkout waits for a free connection (default: 5s).
    pub checkout_timeout: Duration,
    /// Close connections idle this long (default: 10 min). `None` keeps them.
    pub idle_timeout: Option<Duration>,
    /// Replace connections older than this (default: 30 min). `None` keeps them.
    pub max_lifetime: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 16,
            busy_timeout_ms: 30_000,
            checkout_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(10 * 60)),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
        }
    }
}

impl ConnectionConfig {
    /// The same settings with the pool pinned to one connection that is never
    /// reaped. An in-memory database lives exactly as long as its connection.
    pub fn pinned(&self) -> Self {
        Self {
            pool_size: 1,
            idle_timeout: None,
            max_lifetime: None,
            ..self.clone()
        }
    }
}

/// `SQLite` pragma customizer that runs on each new connection.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))?;
        Ok(())
    }
}

/// Create an in-memory connection pool.
///
/// Every connection opens its own private in-memory database, so the pool
/// is always [`ConnectionConfig::pinned`]: one connection, never reaped.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    build(SqliteConnectionManager::memory(), &config.pinned())
}

/// Create a file-backed connection pool.
pub fn new_file(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    build(SqliteConnectionManager::file(path), config)
}

fn build(manager: SqliteConnectionManager, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.checkout_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal_mode(conn: &Connection) -> String {
        conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn in_memory_pool_creates_successfully() {
        let config = ConnectionConfig {
            pool_size: 1,
            ..Default::default()
        };
        let pool = new_in_memory(&config).unwrap();
        let conn = pool.acquire().unwrap();
        let mode = journal_mode(&conn);
        assert!(mode == "wal" || mode == "memory", "got: {mode}");
        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn file_pool_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test.db");
        let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
        let conn = pool.acquire().unwrap();
        assert_eq!(journal_mode(&conn), "wal");
        assert!(path.exists());
    }

    #[test]
    fn exhausted_pool_reports_pool_error() {
        let config = ConnectionConfig {
            pool_size: 1,
            checkout_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let pool = new_in_memory(&config).unwrap();
        let _held = pool.acquire().unwrap();
        let err = pool.acquire().unwrap_err();
        assert!(matches!(err, crate::errors::StoreError::Pool(_)));
    }

    #[test]
    fn default_config_values() {
        let config = ConnectionConfig::default();
        assert_eq!(config.pool_size, 16);
        assert_eq!(config.busy_timeout_ms, 30_000);
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.max_lifetime, Some(Duration::from_secs(1_800)));
    }

    #[test]
    fn pinned_config_is_never_reaped() {
        let config = ConnectionConfig {
            pool_size: 8,
            busy_timeout_ms: 1_000,
            ..Default::default()
        }
        .pinned();
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.max_lifetime, None);
        assert_eq!(config.busy_timeout_ms, 1_000);
    }

    #[test]
    fn in_memory_pool_keeps_one_database() {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        assert_eq!(pool.max_size(), 1);
        pool.acquire()
            .unwrap()
            .execute_batch("CREATE TABLE kept (id INTEGER)")
            .unwrap();

        let count: i64 = pool
            .acquire()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'kept'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
