//! Embedded schema versions for the livepipe database.
//!
//! `schema_version` holds one row per applied step. A database stamped with
//! a version this binary does not know is refused rather than served.

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

/// One schema step.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Steps in ascending version order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Users, livestreams, tags, reactions and sessions",
    sql: include_str!("v001_schema.sql"),
}];

/// Bring `conn` up to [`latest_version`] and return how many steps ran.
///
/// # Errors
///
/// Fails with [`StoreError::Migration`] when a step fails (that step is
/// rolled back) or when the database is newer than this binary.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  INTEGER NOT NULL,
           description TEXT    NOT NULL
         );",
    )
    .map_err(|e| migration_error(0, "create schema_version", &e))?;

    let current = current_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(StoreError::Migration {
            message: format!("database is at schema v{current}, this build knows v{latest}"),
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        debug!(version = current, "schema up to date");
        return Ok(0);
    }
    for step in &pending {
        info!(version = step.version, description = step.description, "applying schema step");
        apply(conn, step)?;
    }

    let applied = u32::try_from(pending.len()).unwrap_or(u32::MAX);
    info!(from = current, to = latest, applied, "schema migrated");
    Ok(applied)
}

/// Highest applied version, or 0 on a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| migration_error(0, "read schema_version", &e))
}

/// Highest version compiled into this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

// ── Internal ────────────────────────────────────────────────────────

fn apply(conn: &Connection, step: &Migration) -> Result<()> {
    let fail = |stage: &str, e: &rusqlite::Error| migration_error(step.version, stage, e);

    let tx = conn.unchecked_transaction().map_err(|e| fail("begin", &e))?;
    tx.execute_batch(step.sql).map_err(|e| fail(step.description, &e))?;
    let _ = tx
        .execute(
            "INSERT INTO schema_version (version, applied_at, description)
             VALUES (?1, CAST(strftime('%s', 'now') AS INTEGER), ?2)",
            params![step.version, step.description],
        )
        .map_err(|e| fail("record", &e))?;
    tx.commit().map_err(|e| fail("commit", &e))
}

fn migration_error(version: u32, stage: &str, err: &rusqlite::Error) -> StoreError {
    StoreError::Migration {
        message: format!("schema v{version}: {stage} failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_memory() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(std::result::Result::ok)
            .collect()
    }

    #[test]
    fn run_migrations_creates_all_tables() {
        let conn = open_memory();
        assert_eq!(run_migrations(&conn).unwrap(), 1);

        let tables = table_names(&conn);
        for expected in [
            "icons",
            "livestream_tags",
            "livestreams",
            "reactions",
            "schema_version",
            "sessions",
            "tags",
            "themes",
            "users",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let conn = open_memory();
        run_migrations(&conn).unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), 0);
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn versions_are_strictly_ascending() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert!(MIGRATIONS.iter().all(|m| m.version > 0));
    }

    #[test]
    fn newer_database_is_refused() {
        let conn = open_memory();
        run_migrations(&conn).unwrap();
        conn.execute_batch(&format!(
            "INSERT INTO schema_version (version, applied_at, description)
             VALUES ({}, 0, 'future')",
            latest_version() + 1
        ))
        .unwrap();

        let err = run_migrations(&conn).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }), "{err}");
        assert!(err.to_string().contains("this build knows"), "{err}");
    }

    #[test]
    fn failed_step_leaves_no_version_row() {
        let conn = open_memory();
        conn.execute_batch("CREATE TABLE icons (id INTEGER PRIMARY KEY)").unwrap();

        assert!(run_migrations(&conn).is_err());
        assert_eq!(current_version(&conn).unwrap(), 0);
        let tables = table_names(&conn);
        assert!(!tables.iter().any(|t| t == "reactions"), "{tables:?}");
    }
}
