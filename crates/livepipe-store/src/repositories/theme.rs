//! Theme repository. Each user has at most one theme row.

use livepipe_core::{ThemeId, UserId};
use rusqlite::{params, Connection};
use tracing::instrument;

use super::query_in;
use crate::errors::Result;
use crate::row_types::ThemeRow;

/// Theme repository: stateless, every method takes `&Connection`.
pub struct ThemeRepo;

impl ThemeRepo {
    pub fn insert(conn: &Connection, user_id: UserId, dark_mode: bool) -> Result<ThemeRow> {
        let _ = conn.execute(
            "INSERT INTO themes (user_id, dark_mode) VALUES (?1, ?2)",
            params![user_id.get(), dark_mode],
        )?;
        Ok(ThemeRow {
            id: ThemeId::new(conn.last_insert_rowid()),
            user_id,
            dark_mode,
        })
    }

    /// Themes for the given owners, one statement.
    #[instrument(skip(conn, user_ids), fields(count = user_ids.len()))]
    pub fn get_by_user_ids(conn: &Connection, user_ids: &[UserId]) -> Result<Vec<ThemeRow>> {
        let raw: Vec<i64> = user_ids.iter().map(|id| id.get()).collect();
        query_in(
            conn,
            "SELECT id, user_id, dark_mode FROM themes WHERE user_id IN ({in})",
            &raw,
            |row| {
                Ok(ThemeRow {
                    id: ThemeId::new(row.get(0)?),
                    user_id: UserId::new(row.get(1)?),
                    dark_mode: row.get(2)?,
                })
            },
        )
    }
}
