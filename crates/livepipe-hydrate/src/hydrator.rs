//! Aggregate hydration: raw rows to nested response entities.
//!
//! Hydrators compose [`BatchResolver`]s and never join tables themselves.
//! [`LivestreamHydrator`] reuses [`UserHydrator`] for owners, so a reaction
//! hydrates as a shallow tree: reaction → livestream → owner. Each level
//! costs a fixed number of batched lookups regardless of row count.

use std::collections::HashMap;
use std::sync::LazyLock;

use livepipe_core::{Livestream, LivestreamId, Reaction, Tag, Theme, User, UserId};
use livepipe_store::{LivestreamRow, ReactionRow, UserRow};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::assembler::assemble;
use crate::resolver::{
    BatchResolver, IconLookup, LivestreamLookup, LivestreamTagLookup, ThemeLookup, UserLookup,
};

static FALLBACK_ICON: &[u8] = include_bytes!("../assets/no_image.svg");

static FALLBACK_ICON_HASH: LazyLock<String> = LazyLock::new(|| icon_hash(FALLBACK_ICON));

/// Lowercase hex SHA-256 of an icon image.
pub fn icon_hash(image: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image);
    format!("{:x}", hasher.finalize())
}

/// Hash reported for users who never uploaded an icon.
pub fn fallback_icon_hash() -> &'static str {
    &FALLBACK_ICON_HASH
}

/// Hydrates users with their theme and icon hash.
#[derive(Clone, Debug, Default)]
pub struct UserHydrator {
    themes: BatchResolver<ThemeLookup>,
    icons: BatchResolver<IconLookup>,
}

impl UserHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `User` per row, in row order.
    #[instrument(skip_all, fields(count = rows.len()))]
    pub fn hydrate(&self, conn: &Connection, rows: &[UserRow]) -> livepipe_store::Result<Vec<User>> {
        let ids = rows.iter().map(|row| row.id);
        let themes = self.themes.resolve(conn, ids.clone())?;
        // Several uploads per user: the newest icon is the last row and wins.
        let icons = self.icons.resolve(conn, ids)?;

        Ok(rows
            .iter()
            .map(|row| User {
                id: row.id,
                name: row.name.clone(),
                display_name: row.display_name.clone(),
                description: row.description.clone(),
                theme: themes
                    .get(&row.id)
                    .map(|t| Theme {
                        id: t.id,
                        dark_mode: t.dark_mode,
                    })
                    .unwrap_or_default(),
                icon_hash: icons
                    .get(&row.id)
                    .map_or_else(|| fallback_icon_hash().to_string(), |icon| icon_hash(&icon.image)),
            })
            .collect())
    }

    /// Like [`hydrate`](Self::hydrate), keyed by user id.
    pub fn hydrate_map(
        &self,
        conn: &Connection,
        rows: &[UserRow],
    ) -> livepipe_store::Result<HashMap<UserId, User>> {
        Ok(self
            .hydrate(conn, rows)?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }
}

/// Hydrates livestreams with their owner and tags.
#[derive(Clone, Debug, Default)]
pub struct LivestreamHydrator {
    owners: BatchResolver<UserLookup>,
    users: UserHydrator,
    tags: BatchResolver<LivestreamTagLookup>,
}

impl LivestreamHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `Livestream` per row, in row order. A missing owner row yields
    /// the zero `User`.
    #[instrument(skip_all, fields(count = rows.len()))]
    pub fn hydrate(
        &self,
        conn: &Connection,
        rows: &[LivestreamRow],
    ) -> livepipe_store::Result<Vec<Livestream>> {
        let owner_rows: Vec<UserRow> = self
            .owners
            .resolve(conn, rows.iter().map(|row| row.user_id))?
            .into_values()
            .collect();
        let owners = self.users.hydrate_map(conn, &owner_rows)?;
        let mut tags = self.tags.resolve_grouped(conn, rows.iter().map(|row| row.id))?;

        Ok(rows
            .iter()
            .map(|row| Livestream {
                id: row.id,
                owner: owners.get(&row.user_id).cloned().unwrap_or_default(),
                title: row.title.clone(),
                description: row.description.clone(),
                playlist_url: row.playlist_url.clone(),
                thumbnail_url: row.thumbnail_url.clone(),
                tags: tags
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|t| Tag {
                        id: t.tag.id,
                        name: t.tag.name,
                    })
                    .collect(),
                start_at: row.start_at,
                end_at: row.end_at,
            })
            .collect())
    }

    /// Like [`hydrate`](Self::hydrate), keyed by livestream id.
    pub fn hydrate_map(
        &self,
        conn: &Connection,
        rows: &[LivestreamRow],
    ) -> livepipe_store::Result<HashMap<LivestreamId, Livestream>> {
        Ok(self
            .hydrate(conn, rows)?
            .into_iter()
            .map(|livestream| (livestream.id, livestream))
            .collect())
    }
}

/// Hydrates reaction facts: resolves every distinct user and livestream
/// they reference, then assembles one response per fact.
#[derive(Clone, Debug, Default)]
pub struct ReactionHydrator {
    users: BatchResolver<UserLookup>,
    user_hydrator: UserHydrator,
    livestreams: BatchResolver<LivestreamLookup>,
    livestream_hydrator: LivestreamHydrator,
}

impl ReactionHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip_all, fields(count = facts.len()))]
    pub fn hydrate(
        &self,
        conn: &Connection,
        facts: &[ReactionRow],
    ) -> livepipe_store::Result<Vec<Reaction>> {
        let user_rows: Vec<UserRow> = self
            .users
            .resolve(conn, facts.iter().map(|fact| fact.user_id))?
            .into_values()
            .collect();
        let users = self.user_hydrator.hydrate_map(conn, &user_rows)?;

        let livestream_rows: Vec<LivestreamRow> = self
            .livestreams
            .resolve(conn, facts.iter().map(|fact| fact.livestream_id))?
            .into_values()
            .collect();
        let livestreams = self.livestream_hydrator.hydrate_map(conn, &livestream_rows)?;

        Ok(assemble(facts, &users, &livestreams))
    }
}
