//! Session verification.
//!
//! Clients present a session token either as the `livepipe_session` cookie or
//! as an `Authorization: Bearer` header. Verification is synchronous and runs
//! on the blocking pool next to the request's store work.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use livepipe_core::{AuthError, AuthenticatedUser};
use livepipe_store::{ConnectionProvider, SessionRepo};
use tracing::debug;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "livepipe_session";

/// Resolves request headers to an authenticated user.
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError>;
}

/// Extract the session token from the cookie, falling back to a bearer token.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

/// Verifies tokens against the `sessions` table.
pub struct SqliteSessionVerifier {
    provider: Arc<dyn ConnectionProvider>,
}

impl SqliteSessionVerifier {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }
}

impl SessionVerifier for SqliteSessionVerifier {
    fn verify(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let token = session_token(headers).ok_or(AuthError::MissingSession)?;

        let conn = self
            .provider
            .acquire()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let session = SessionRepo::get(&conn, &token)
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
            .ok_or(AuthError::UnknownSession)?;

        if session.expires_at <= chrono::Utc::now().timestamp() {
            debug!(user_id = %session.user_id, "session expired");
            return Err(AuthError::Expired);
        }
        Ok(AuthenticatedUser::new(session.user_id))
    }
}
