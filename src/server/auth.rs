//! Caller identity. The fronting auth provider sets `x-user-id`; the id
//! must belong to a known user.

use super::AppState;
use crate::models::{User, UserRole};
use crate::Error;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Any authenticated user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// An authenticated user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        let user = state.authenticate(user_id).await?;
        Ok(AuthUser(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            tracing::warn!("User {} attempted an admin operation", user.id);
            return Err(Error::Forbidden("admin role required".to_string()));
        }
        Ok(AdminUser(user))
    }
}
