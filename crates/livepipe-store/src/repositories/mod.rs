//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`
//! parameter. Inside a unit of work that connection is the open transaction
//! (a `rusqlite::Transaction` dereferences to `Connection`), so every read
//! sees the writes made earlier in the same request.

pub mod icon;
pub mod livestream;
pub mod reaction;
pub mod session;
pub mod tag;
pub mod theme;
pub mod user;

use rusqlite::{params_from_iter, Connection, Row};

use crate::errors::Result;

/// Numbered placeholder list `?1, ?2, …, ?n`.
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run one batched `IN (…)` query.
///
/// `sql` must contain exactly one `{in}` marker, replaced by the placeholder
/// list; the ids themselves are bound as parameters. An empty id list runs
/// no statement at all, since `IN ()` is not valid SQL.
pub(crate) fn query_in<T, F>(conn: &Connection, sql: &str, ids: &[i64], map: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = sql.replace("{in}", &placeholders(ids.len()));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered() {
        assert_eq!(placeholders(1), "?1");
        assert_eq!(placeholders(3), "?1, ?2, ?3");
    }

    #[test]
    fn query_in_empty_runs_nothing() {
        // Invalid SQL proves no statement was prepared.
        let conn = Connection::open_in_memory().unwrap();
        let rows: Vec<i64> = query_in(&conn, "NOT SQL {in}", &[], |row| row.get(0)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn query_in_binds_all_ids() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER PRIMARY KEY);
             INSERT INTO t (id) VALUES (1), (2), (3), (4);",
        )
        .unwrap();
        let rows: Vec<i64> = query_in(
            &conn,
            "SELECT id FROM t WHERE id IN ({in}) ORDER BY id",
            &[4, 2, 9],
            |row| row.get(0),
        )
        .unwrap();
        assert_eq!(rows, vec![2, 4]);
    }
}
