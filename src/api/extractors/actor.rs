use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use std::sync::Arc;
use crate::error::AppError;
use crate::state::AppState;

/// The acting user's id, taken from the `X-Actor-Id` header. Identity is
/// established upstream (gateway); this service only threads the opaque id
/// into `last_modified_by` and the audit trail.
pub struct ActorId(pub String);

impl FromRequestParts<Arc<AppState>> for ActorId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get("X-Actor-Id")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(ActorId(actor.to_string()))
    }
}
