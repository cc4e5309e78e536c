use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use crate::shared::models::AppState;

/// Header the upstream auth layer sets to the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity, available to handlers as an extension.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: u64,
}

pub async fn ownership_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing user id".to_string()))?;

    let user_id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid user id: {}", raw)))?;

    if user_id != state.owner_id {
        warn!(user = user_id, path = %request.uri().path(), "Rejected request from non-owner");
        return Err(ApiError::Unauthorized(
            "only the instance owner may manage this service".to_string(),
        ));
    }

    info!(
        method = %request.method(),
        path = %request.uri().path(),
        user = user_id,
        "API request"
    );

    request.extensions_mut().insert(Caller { user_id });
    Ok(next.run(request).await)
}
