//! Server administration routes
//!
//! Every handler starts with [`require_super_admin`]; nothing is read or
//! written for callers without the capability.

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use glossa_shared::{OrganizationView, Page, PageQuery, Role, UserAccount, UserId};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    auth::{require_super_admin, AuthUser},
    directory::{ORGANIZATION_SORT_FIELDS, USER_SORT_FIELDS},
    error::{ApiError, ApiResult, Message},
    state::AppState,
};

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct UserAccountModel {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub global_server_role: Role,
    pub disabled: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub disabled_at: Option<OffsetDateTime>,
}

impl From<UserAccount> for UserAccountModel {
    fn from(user: UserAccount) -> Self {
        Self {
            disabled: !user.is_enabled(),
            id: user.id,
            username: user.username,
            name: user.name,
            global_server_role: user.role,
            disabled_at: user.disabled_at,
        }
    }
}

// =============================================================================
// Path Parsing
// =============================================================================

/// Parse a user id path segment
fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    raw.parse::<i64>()
        .map(UserId)
        .map_err(|_| ApiError::Validation(format!("invalid user id '{raw}'")))
}

/// Parse a user id segment on routes that only match digits.
/// Anything else does not match the route at all.
fn parse_digit_user_id(raw: &str) -> ApiResult<UserId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse::<i64>().map(UserId).map_err(|_| ApiError::NotFound)
}

/// Malformed `page`/`size` values answer with the JSON validation error
fn page_query(query: Result<Query<PageQuery>, QueryRejection>) -> ApiResult<PageQuery> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

// =============================================================================
// Handlers
// =============================================================================

/// List all organizations on the server
pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Page<OrganizationView>>> {
    require_super_admin(&caller)?;

    let request = page_query(query)?.into_request(ORGANIZATION_SORT_FIELDS, "name")?;
    let page = state
        .organizations
        .find_all_paged(&request, caller.user_id)
        .await?;

    Ok(Json(page))
}

/// List all users on the server, disabled ones included
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Page<UserAccountModel>>> {
    require_super_admin(&caller)?;

    let request = page_query(query)?.into_request(USER_SORT_FIELDS, "name")?;
    let page = state.users.find_all_paged(&request).await?;

    Ok(Json(page.map(UserAccountModel::from)))
}

/// Delete a user account
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    require_super_admin(&caller)?;
    let user_id = parse_user_id(&user_id)?;

    if user_id == caller.user_id {
        return Err(ApiError::BadRequest(Message::CannotDeleteYourOwnAccount));
    }

    state.users.delete(user_id).await?;
    tracing::info!(admin_id = %caller.user_id, %user_id, "Admin deleted user");

    Ok(StatusCode::OK)
}

/// Disable a user account
pub async fn disable_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    require_super_admin(&caller)?;
    let user_id = parse_user_id(&user_id)?;

    if user_id == caller.user_id {
        return Err(ApiError::BadRequest(Message::CannotDisableYourOwnAccount));
    }

    state.users.disable(user_id).await?;
    tracing::info!(admin_id = %caller.user_id, %user_id, "Admin disabled user");

    Ok(StatusCode::OK)
}

/// Re-enable a user account
pub async fn enable_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    require_super_admin(&caller)?;
    let user_id = parse_user_id(&user_id)?;

    state.users.enable(user_id).await?;
    tracing::info!(admin_id = %caller.user_id, %user_id, "Admin enabled user");

    Ok(StatusCode::OK)
}

/// Change the server-wide role of a user
pub async fn set_role(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, role)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    require_super_admin(&caller)?;
    let user_id = parse_digit_user_id(&user_id)?;
    let role: Role = role
        .parse()
        .map_err(|e: glossa_shared::UnknownRole| ApiError::Validation(e.to_string()))?;

    let mut user = state.users.get(user_id).await?;
    let previous = user.role;
    user.role = role;
    state.users.save(&user).await?;

    tracing::info!(
        admin_id = %caller.user_id,
        %user_id,
        from = %previous,
        to = %role,
        "Admin changed user role"
    );

    Ok(StatusCode::OK)
}

/// Mint a super token for another user
pub async fn generate_user_token(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<String>> {
    require_super_admin(&caller)?;
    let user_id = parse_digit_user_id(&user_id)?;

    let user = state.users.get(user_id).await?;
    let token = state.tokens.issue(user.id, true).map_err(|e| {
        tracing::error!(error = %e, %user_id, "Failed to issue impersonation token");
        ApiError::Internal
    })?;

    tracing::info!(
        admin_id = %caller.user_id,
        admin_super_token = caller.super_token,
        %user_id,
        "Admin generated impersonation token"
    );

    Ok(Json(token))
}
