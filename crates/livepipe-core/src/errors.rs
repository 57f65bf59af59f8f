//! Client-facing error types.
//!
//! [`ValidationError`] covers malformed request input and is raised before
//! any transaction is opened. [`AuthError`] is raised by session verification
//! before any store access.

use thiserror::Error;

/// Malformed request input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An identifier parameter was not an integer.
    #[error("{field} in path must be integer")]
    InvalidId {
        /// Parameter name, e.g. `livestream_id`.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// The `limit` query parameter was not a non-negative integer.
    #[error("limit query parameter must be integer")]
    InvalidLimit {
        /// The raw value that failed to parse.
        value: String,
    },

    /// The query string could not be decoded.
    #[error("failed to decode the query string: {0}")]
    InvalidQuery(String),

    /// The request body could not be decoded.
    #[error("failed to decode the request body as json: {0}")]
    InvalidBody(String),
}

/// Session verification failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No session credential was presented.
    #[error("session not found")]
    MissingSession,

    /// A credential was presented but matches no session.
    #[error("session is unknown")]
    UnknownSession,

    /// The session exists but its expiry has passed.
    #[error("session has expired")]
    Expired,

    /// The session store could not be consulted.
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_limit_display() {
        let err = ValidationError::InvalidLimit {
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "limit query parameter must be integer");
    }

    #[test]
    fn invalid_body_display() {
        let err = ValidationError::InvalidBody("EOF while parsing".into());
        assert_eq!(
            err.to_string(),
            "failed to decode the request body as json: EOF while parsing"
        );
    }

    #[test]
    fn auth_error_display() {
        assert_eq!(AuthError::MissingSession.to_string(), "session not found");
        assert_eq!(AuthError::Expired.to_string(), "session has expired");
    }
}
