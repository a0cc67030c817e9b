use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    api::AppState,
    db::SessionToken,
    error::{AppError, AppResult},
    models::UserId,
};

/// The logged-in user behind a request
///
/// Extracting this from a handler makes the route require a valid
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub token: SessionToken,
}

/// Pulls the session token out of an `Authorization: Bearer` header
fn bearer_token(parts: &Parts) -> AppResult<SessionToken> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .and_then(|t| t.trim().parse().ok())
        .ok_or_else(|| AppError::Unauthorized("Malformed session token".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let user_id = state
            .sessions
            .resolve(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or unknown".to_string()))?;

        Ok(CurrentUser { user_id, token })
    }
}
