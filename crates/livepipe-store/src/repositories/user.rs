//! User repository.

use livepipe_core::UserId;
use rusqlite::{params, Connection};
use tracing::instrument;

use super::query_in;
use crate::errors::Result;
use crate::row_types::{NewUser, UserRow};

/// User repository: stateless, every method takes `&Connection`.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user and return the stored row.
    pub fn insert(conn: &Connection, user: &NewUser) -> Result<UserRow> {
        let _ = conn.execute(
            "INSERT INTO users (name, display_name, description) VALUES (?1, ?2, ?3)",
            params![user.name, user.display_name, user.description],
        )?;
        Ok(UserRow {
            id: UserId::new(conn.last_insert_rowid()),
            name: user.name.clone(),
            display_name: user.display_name.clone(),
            description: user.description.clone(),
        })
    }

    /// Fetch users by id in one statement. Ids with no row are simply absent
    /// from the result; order is unspecified.
    #[instrument(skip(conn, ids), fields(count = ids.len()))]
    pub fn get_by_ids(conn: &Connection, ids: &[UserId]) -> Result<Vec<UserRow>> {
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        query_in(
            conn,
            "SELECT id, name, display_name, description FROM users WHERE id IN ({in})",
            &raw,
            Self::map_row,
        )
    }

    /// Delete a user row. Returns whether a row was removed.
    pub fn delete(conn: &Connection, id: UserId) -> Result<bool> {
        let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id.get()])?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
        Ok(UserRow {
            id: UserId::new(row.get(0)?),
            name: row.get(1)?,
            display_name: row.get(2)?,
            description: row.get(3)?,
        })
    }
}
