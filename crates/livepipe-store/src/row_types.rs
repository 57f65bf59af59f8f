//! Database row types for mapping between `SQLite` rows and Rust structs.
//!
//! These represent the raw row shape - foreign keys are left unresolved.
//! Turning rows into response entities is the hydration layer's job.

use livepipe_core::{LivestreamId, ReactionId, TagId, ThemeId, UserId};

/// Raw reaction row from the `reactions` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionRow {
    pub id: ReactionId,
    pub emoji_name: String,
    pub user_id: UserId,
    pub livestream_id: LivestreamId,
    /// Epoch seconds.
    pub created_at: i64,
}

/// Input for inserting a reaction; the identity is assigned by the store.
#[derive(Clone, Debug)]
pub struct NewReaction {
    pub emoji_name: String,
    pub user_id: UserId,
    pub livestream_id: LivestreamId,
    pub created_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub display_name: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeRow {
    pub id: ThemeId,
    pub user_id: UserId,
    pub dark_mode: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconRow {
    pub id: i64,
    pub user_id: UserId,
    pub image: Vec<u8>,
}

/// Raw livestream row; `user_id` is the owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LivestreamRow {
    pub id: LivestreamId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub playlist_url: String,
    pub thumbnail_url: String,
    pub start_at: i64,
    pub end_at: i64,
}

#[derive(Clone, Debug)]
pub struct NewLivestream {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub playlist_url: String,
    pub thumbnail_url: String,
    pub start_at: i64,
    pub end_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRow {
    pub id: TagId,
    pub name: String,
}

/// A tag joined through `livestream_tags`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LivestreamTagRow {
    pub livestream_id: LivestreamId,
    pub tag: TagRow,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRow {
    pub token: String,
    pub user_id: UserId,
    /// Epoch seconds.
    pub expires_at: i64,
}
