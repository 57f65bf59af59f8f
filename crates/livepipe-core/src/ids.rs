//! Integer identifiers of the stored entities.
//!
//! Each id is a distinct newtype so a user id can never be bound where a
//! livestream id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::errors::ValidationError;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident, $field:expr) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw store id.
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Parse a request parameter (path segment or form value).
            pub fn parse_param(raw: &str) -> Result<Self, ValidationError> {
                raw.parse().map_err(|_| ValidationError::InvalidId {
                    field: $field,
                    value: raw.to_string(),
                })
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

integer_id!(
    /// Id of a row in `users`.
    UserId,
    "user_id"
);
integer_id!(
    /// Id of a row in `livestreams`.
    LivestreamId,
    "livestream_id"
);
integer_id!(
    /// Id of a row in `reactions`.
    ReactionId,
    "reaction_id"
);
integer_id!(
    /// Id of a row in `tags`.
    TagId,
    "tag_id"
);
integer_id!(
    /// Id of a row in `themes`.
    ThemeId,
    "theme_id"
);
