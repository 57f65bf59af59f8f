//! Session repository. Tokens are opaque strings handed to clients.

use livepipe_core::UserId;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::errors::Result;
use crate::row_types::SessionRow;

/// Session repository: stateless, every method takes `&Connection`.
pub struct SessionRepo;

impl SessionRepo {
    /// Issue a new session token for `user_id`, valid until `expires_at`
    /// (epoch seconds).
    pub fn create(conn: &Connection, user_id: UserId, expires_at: i64) -> Result<SessionRow> {
        let token = Uuid::now_v7().to_string();
        let _ = conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user_id.get(), expires_at],
        )?;
        Ok(SessionRow {
            token,
            user_id,
            expires_at,
        })
    }

    /// Look up a session by token. Expiry is not checked here.
    pub fn get(conn: &Connection, token: &str) -> Result<Option<SessionRow>> {
        let row = conn
            .query_row(
                "SELECT token, user_id, expires_at FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(SessionRow {
                        token: row.get(0)?,
                        user_id: UserId::new(row.get(1)?),
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Remove every session past its expiry. Returns the number removed.
    pub fn delete_expired(conn: &Connection, now: i64) -> Result<usize> {
        let removed = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::conn;

    #[test]
    fn create_then_get() {
        let conn = conn();
        let created = SessionRepo::create(&conn, UserId::new(3), 2_000).unwrap();
        let found = SessionRepo::get(&conn, &created.token).unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[test]
    fn tokens_are_unique() {
        let conn = conn();
        let a = SessionRepo::create(&conn, UserId::new(1), 10).unwrap();
        let b = SessionRepo::create(&conn, UserId::new(1), 10).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn unknown_token_is_none() {
        let conn = conn();
        assert!(SessionRepo::get(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn delete_expired_keeps_live_sessions() {
        let conn = conn();
        let old = SessionRepo::create(&conn, UserId::new(1), 100).unwrap();
        let live = SessionRepo::create(&conn, UserId::new(1), 500).unwrap();
        assert_eq!(SessionRepo::delete_expired(&conn, 200).unwrap(), 1);
        assert!(SessionRepo::get(&conn, &old.token).unwrap().is_none());
        assert!(SessionRepo::get(&conn, &live.token).unwrap().is_some());
    }
}
