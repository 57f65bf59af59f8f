//! Validated row limit for list queries.
//!
//! A [`Limit`] only exists once the raw query text parsed as a non-negative
//! integer that fits a `SQLite` integer. Store code binds it as a statement
//! parameter; it is never formatted into SQL text.

use std::fmt;

use crate::errors::ValidationError;

/// A non-negative row limit.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Limit(u64);

impl Limit {
    /// Wrap an already-validated row count.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// The row count.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse raw query text. Surrounding whitespace is rejected, and so is
    /// anything above `i64::MAX`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        raw.parse::<u64>()
            .ok()
            .filter(|n| i64::try_from(*n).is_ok())
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidLimit {
                value: raw.to_string(),
            })
    }

    /// Parse an optional query parameter. Absent and empty both mean "no limit".
    pub fn from_query(raw: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
