//! Batched reference resolution.
//!
//! A [`BatchResolver`] turns a set of foreign keys into a key → row map
//! with a single store round trip. Keys are deduplicated into an ordered set
//! first; an empty set never reaches the store.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use livepipe_core::{LivestreamId, UserId};
use livepipe_store::{
    IconRepo, IconRow, LivestreamRepo, LivestreamRow, LivestreamTagRow, TagRepo, ThemeRepo,
    ThemeRow, UserRepo, UserRow,
};
use rusqlite::Connection;
use tracing::debug;

/// One batched lookup against the store.
///
/// `fetch` must issue at most one statement for the whole key slice.
pub trait BatchLookup {
    /// Foreign key being resolved.
    type Key: Copy + Ord + Hash + std::fmt::Debug;
    /// Row returned for a key.
    type Row;

    /// Short label used in logs.
    const NAME: &'static str;

    /// Rows matching any of `keys`, in no particular order.
    fn fetch(&self, conn: &Connection, keys: &[Self::Key]) -> livepipe_store::Result<Vec<Self::Row>>;

    /// The key a fetched row answers.
    fn key_of(row: &Self::Row) -> Self::Key;
}

/// Resolves keys of one type through a [`BatchLookup`].
#[derive(Clone, Debug, Default)]
pub struct BatchResolver<L> {
    lookup: L,
}

impl<L: BatchLookup> BatchResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve `keys` to at most one row per key. Keys with no row are absent
    /// from the map. If the lookup returns several rows for one key, the last
    /// one wins.
    pub fn resolve<I>(&self, conn: &Connection, keys: I) -> livepipe_store::Result<HashMap<L::Key, L::Row>>
    where
        I: IntoIterator<Item = L::Key>,
    {
        let rows = self.fetch_distinct(conn, keys)?;
        Ok(rows.into_iter().map(|row| (L::key_of(&row), row)).collect())
    }

    /// Resolve one-to-many references. Each key maps to its rows in the
    /// order the lookup returned them.
    pub fn resolve_grouped<I>(
        &self,
        conn: &Connection,
        keys: I,
    ) -> livepipe_store::Result<HashMap<L::Key, Vec<L::Row>>>
    where
        I: IntoIterator<Item = L::Key>,
    {
        let rows = self.fetch_distinct(conn, keys)?;
        let mut grouped: HashMap<L::Key, Vec<L::Row>> = HashMap::new();
        for row in rows {
            grouped.entry(L::key_of(&row)).or_default().push(row);
        }
        Ok(grouped)
    }

    fn fetch_distinct<I>(&self, conn: &Connection, keys: I) -> livepipe_store::Result<Vec<L::Row>>
    where
        I: IntoIterator<Item = L::Key>,
    {
        let distinct: Vec<L::Key> = keys.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        if distinct.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.lookup.fetch(conn, &distinct)?;
        debug!(lookup = L::NAME, keys = distinct.len(), rows = rows.len(), "batched lookup");
        Ok(rows)
    }
}

/// Users by id.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserLookup;

impl BatchLookup for UserLookup {
    type Key = UserId;
    type Row = UserRow;
    const NAME: &'static str = "users";

    /// Rows matching any of `keys`, in no particular order.
    fn fetch(&self, conn: &Connection, keys: &[UserId]) -> livepipe_store::Result<Vec<UserRow>> {
        UserRepo::get_by_ids(conn, keys)
    }

    fn key_of(row: &UserRow) -> UserId {
        row.id
    }
}

/// Themes by owning user.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThemeLookup;

impl BatchLookup for ThemeLookup {
    type Key = UserId;
    type Row = ThemeRow;
    const NAME: &'static str = "themes";

    /// Rows matching any of `keys`, in no particular order.
    fn fetch(&self, conn: &Connection, keys: &[UserId]) -> livepipe_store::Result<Vec<ThemeRow>> {
        ThemeRepo::get_by_user_ids(conn, keys)
    }

    fn key_of(row: &ThemeRow) -> UserId {
        row.user_id
    }
}

/// Icons by owning user, oldest upload first.
#[derive(Clone, Copy, Debug, Default)]
pub struct IconLookup;

impl BatchLookup for IconLookup {
    type Key = UserId;
    type Row = IconRow;
    const NAME: &'static str = "icons";

    /// Rows matching any of `keys`, in no particular order.
    fn fetch(&self, conn: &Connection, keys: &[UserId]) -> livepipe_store::Result<Vec<IconRow>> {
        IconRepo::get_by_user_ids(conn, keys)
    }

    fn key_of(row: &IconRow) -> UserId {
        row.user_id
    }
}

/// Livestreams by id.
#[derive(Clone, Copy, Debug, Default)]
pub struct LivestreamLookup;

impl BatchLookup for LivestreamLookup {
    type Key = LivestreamId;
    type Row = LivestreamRow;
    const NAME: &'static str = "livestreams";

    fn fetch(
        &self,
        conn: &Connection,
        keys: &[LivestreamId],
    ) -> livepipe_store::Result<Vec<LivestreamRow>> {
        LivestreamRepo::get_by_ids(conn, keys)
    }

    fn key_of(row: &LivestreamRow) -> LivestreamId {
        row.id
    }
}

/// Tags attached to livestreams.
#[derive(Clone, Copy, Debug, Default)]
pub struct LivestreamTagLookup;

impl BatchLookup for LivestreamTagLookup {
    type Key = LivestreamId;
    type Row = LivestreamTagRow;
    const NAME: &'static str = "livestream_tags";

    fn fetch(
        &self,
        conn: &Connection,
        keys: &[LivestreamId],
    ) -> livepipe_store::Result<Vec<LivestreamTagRow>> {
        TagRepo::get_by_livestream_ids(conn, keys)
    }

    fn key_of(row: &LivestreamTagRow) -> LivestreamId {
        row.livestream_id
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use livepipe_store::{run_migrations, NewUser};

    /// Records every key slice it is asked for.
    #[derive(Default)]
    struct CountingLookup {
        calls: RefCell<Vec<Vec<i64>>>,
    }

    impl BatchLookup for CountingLookup {
        type Key = i64;
        type Row = (i64, &'static str);
        const NAME: &'static str = "counting";

        fn fetch(
            &self,
            _conn: &Connection,
            keys: &[i64],
        ) -> livepipe_store::Result<Vec<(i64, &'static str)>> {
            self.calls.borrow_mut().push(keys.to_vec());
            Ok(keys
                .iter()
                .filter(|k| **k % 2 == 0)
                .flat_map(|k| [(*k, "first"), (*k, "second")])
                .collect())
        }

        fn key_of(row: &(i64, &'static str)) -> i64 {
            row.0
        }
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn empty_keys_issue_no_lookup() {
        let conn = Connection::open_in_memory().unwrap();
        let resolver = BatchResolver::new(CountingLookup::default());
        assert!(resolver.resolve(&conn, Vec::new()).unwrap().is_empty());
        assert!(resolver.resolve_grouped(&conn, Vec::new()).unwrap().is_empty());
        assert!(resolver.lookup.calls.borrow().is_empty());
    }

    #[test]
    fn duplicates_collapse_into_one_sorted_lookup() {
        let conn = Connection::open_in_memory().unwrap();
        let resolver = BatchResolver::new(CountingLookup::default());
        let _ = resolver.resolve(&conn, vec![4, 2, 4, 4, 3, 2]).unwrap();
        assert_eq!(*resolver.lookup.calls.borrow(), vec![vec![2, 3, 4]]);
    }

    #[test]
    fn unmatched_keys_are_absent_and_last_row_wins() {
        let conn = Connection::open_in_memory().unwrap();
        let resolver = BatchResolver::new(CountingLookup::default());
        let map = resolver.resolve(&conn, vec![1, 2]).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&2], (2, "second"));
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn grouped_keeps_query_order() {
        let conn = Connection::open_in_memory().unwrap();
        let resolver = BatchResolver::new(CountingLookup::default());
        let grouped = resolver.resolve_grouped(&conn, vec![2, 2, 6]).unwrap();
        assert_eq!(grouped[&2], vec![(2, "first"), (2, "second")]);
        assert_eq!(grouped[&6].len(), 2);
        assert_eq!(resolver.lookup.calls.borrow().len(), 1);
    }

    #[test]
    fn user_lookup_hits_store() {
        let conn = conn();
        let alice = UserRepo::insert(
            &conn,
            &NewUser {
                name: "alice".into(),
                display_name: "Alice".into(),
                description: String::new(),
            },
        )
        .unwrap();

        let resolver = BatchResolver::new(UserLookup);
        let map = resolver
            .resolve(&conn, [alice.id, alice.id, UserId::new(99)])
            .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&alice.id], alice);
    }

    #[test]
    fn store_errors_propagate() {
        let conn = conn();
        conn.execute_batch("DROP TABLE users").unwrap();
        let resolver = BatchResolver::new(UserLookup);
        assert!(resolver.resolve(&conn, [UserId::new(1)]).is_err());
    }
}
