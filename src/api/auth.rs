use crate::api::error::AppError;
use crate::api::models::AppState;
use crate::storage::{StorageError, api_keys};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

/// Header carrying the client key. `HeaderMap` lookups are case-insensitive,
/// so `X-API-Key`, `X-Api-Key` and `x-api-key` all resolve here.
pub const API_KEY_HEADER: &str = "x-api-key";

pub fn api_key_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Check the provided key against every active bcrypt hash.
/// On success the request's database session is attached for handlers.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = api_key_from_headers(req.headers()).ok_or_else(|| {
        warn!(path = %req.uri().path(), "Request without API key");
        AppError::AuthRequired
    })?;

    let session = state.database.session();
    let hashes = session
        .run(|conn| Ok::<_, StorageError>(api_keys::active_hashes(conn)?))
        .await
        .map_err(AppError::AuthUnavailable)?;

    let matched = tokio::task::spawn_blocking(move || matches_any(&provided, &hashes))
        .await
        .map_err(|e| AppError::AuthUnavailable(StorageError::Task(e)))?;

    if !matched {
        warn!(path = %req.uri().path(), "Rejected invalid API key");
        return Err(AppError::AuthInvalid);
    }

    debug!("API key accepted");
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Malformed hashes never match.
fn matches_any(provided: &str, hashes: &[String]) -> bool {
    hashes
        .iter()
        .any(|hash| bcrypt::verify(provided, hash).unwrap_or(false))
}
