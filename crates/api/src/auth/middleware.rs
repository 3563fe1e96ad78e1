//! Bearer token authentication and capability checks

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use glossa_shared::{DirectoryError, Role, UserId};
use time::OffsetDateTime;

use super::jwt::{JwtError, JwtManager};
use crate::{
    directory::UserDirectory,
    error::{ApiError, ApiResult},
};

/// State needed by the auth middleware
#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtManager>,
    pub users: Arc<dyn UserDirectory>,
}

/// The authenticated caller, inserted as a request extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: Role,
    /// Token was issued with super-authentication that has not yet lapsed
    pub super_token: bool,
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a valid bearer token for an enabled user
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(&request).ok_or(ApiError::Unauthorized)?;

    let claims = auth.jwt.validate_token(token).map_err(|e| {
        match e {
            JwtError::Expired => tracing::debug!("Rejected expired token"),
            other => tracing::warn!(error = %other, "Rejected invalid token"),
        }
        ApiError::InvalidToken
    })?;

    let user = auth.users.get(claims.sub).await.map_err(|e| match e {
        DirectoryError::NotFound(_) => {
            tracing::warn!(user_id = %claims.sub, "Token subject no longer exists");
            ApiError::Unauthorized
        }
        other => ApiError::from(other),
    })?;

    if !user.is_enabled() {
        tracing::warn!(user_id = %user.id, "Disabled user attempted to authenticate");
        return Err(ApiError::Unauthorized);
    }

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        role: user.role,
        super_token: claims.is_super_at(OffsetDateTime::now_utc()),
    });

    Ok(next.run(request).await)
}

/// Fail unless `caller` is a super-administrator
pub fn require_super_admin(caller: &AuthUser) -> ApiResult<()> {
    if caller.role.is_super_admin() {
        return Ok(());
    }

    tracing::warn!(
        user_id = %caller.user_id,
        role = %caller.role,
        "Non-admin attempted server administration"
    );
    Err(ApiError::Forbidden)
}
