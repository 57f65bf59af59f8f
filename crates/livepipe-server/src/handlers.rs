//! Reaction endpoints.
//!
//! Both handlers do all their work in one blocking task: session
//! verification, input parsing and the service call. The task observes a
//! `CancellationToken` that fires when the handler future is dropped, so a
//! timed-out or abandoned request rolls back instead of committing.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Json;
use livepipe_core::{Limit, LivestreamId, Reaction, ValidationError};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::ApiError;
use crate::server::AppState;

/// Body of `POST /api/livestream/{livestream_id}/reaction`.
#[derive(Debug, Deserialize)]
pub struct PostReactionRequest {
    /// Emoji shortcode, stored as given.
    pub emoji_name: String,
}

/// The `limit` query parameter. The first occurrence wins when repeated.
fn limit_from_query(uri: &Uri) -> Result<Option<Limit>, ValidationError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|e| ValidationError::InvalidQuery(e.body_text()))?;
    let raw = pairs
        .iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.as_str());
    Limit::from_query(raw)
}

/// GET /api/livestream/{livestream_id}/reaction
pub async fn list_reactions(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<Vec<Reaction>>, ApiError> {
    let reactions = run_blocking(move |cancel| {
        let _user = state.verifier.verify(&headers)?;
        let livestream_id = LivestreamId::parse_param(&raw_id)?;
        let limit = limit_from_query(&uri)?;
        Ok(state.reactions.list_reactions(livestream_id, limit, cancel)?)
    })
    .await?;
    Ok(Json(reactions))
}

/// POST /api/livestream/{livestream_id}/reaction
pub async fn post_reaction(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Reaction>), ApiError> {
    let reaction = run_blocking(move |cancel| {
        let livestream_id = LivestreamId::parse_param(&raw_id)?;
        let user = state.verifier.verify(&headers)?;
        let request: PostReactionRequest = serde_json::from_slice(&body)
            .map_err(|e| ValidationError::InvalidBody(e.to_string()))?;
        Ok(state
            .reactions
            .post_reaction(user, livestream_id, request.emoji_name, cancel)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(reaction)))
}

/// Run `work` on the blocking pool with a token that is cancelled when this
/// future is dropped.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&CancellationToken) -> Result<T, ApiError> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    tokio::task::spawn_blocking(move || work(&cancel))
        .await
        .map_err(|e| {
            warn!(error = %e, "request task failed");
            ApiError::internal(e.to_string())
        })?
}
