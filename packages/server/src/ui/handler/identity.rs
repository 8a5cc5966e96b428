//! Caller identity taken from request headers.
//!
//! The header is set by the authenticating proxy in front of the relay; the
//! relay itself trusts it as-is.

use axum::http::{HeaderMap, StatusCode};

use crate::domain::{TipId, UserId};

/// Header carrying the verified user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Required identity. Missing, empty, or unreadable header → 401.
pub fn user_id_from_headers(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    UserId::try_from(raw.to_string()).map_err(|e| {
        tracing::warn!("Invalid user id header: {}", e);
        StatusCode::UNAUTHORIZED
    })
}

/// Optional identity, used only to mark authorship in read-only responses.
pub fn optional_user_id(headers: &HeaderMap) -> Option<UserId> {
    user_id_from_headers(headers).ok()
}

pub fn tip_id_from_path(raw: String) -> Result<TipId, StatusCode> {
    TipId::try_from(raw).map_err(|e| {
        tracing::warn!("Invalid tip id: {}", e);
        StatusCode::BAD_REQUEST
    })
}
