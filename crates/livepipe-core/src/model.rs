//! Hydrated response entities.
//!
//! Every type derives [`Default`]: the default value is the zero entity the
//! hydration layer substitutes when a referenced row does not exist.

use serde::{Deserialize, Serialize};

use crate::ids::{LivestreamId, ReactionId, TagId, ThemeId, UserId};

/// Per-user UI theme.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub dark_mode: bool,
}

/// A fully hydrated user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub theme: Theme,
    pub icon_hash: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A fully hydrated livestream, including its owner and tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livestream {
    pub id: LivestreamId,
    pub owner: User,
    pub title: String,
    pub description: String,
    pub playlist_url: String,
    pub thumbnail_url: String,
    pub tags: Vec<Tag>,
    pub start_at: i64,
    pub end_at: i64,
}

/// A reaction with its user and livestream resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: ReactionId,
    pub emoji_name: String,
    pub user: User,
    pub livestream: Livestream,
    pub created_at: i64,
}
