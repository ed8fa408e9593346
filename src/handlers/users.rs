use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{parse_i64, parse_id};
use crate::middleware::{AdminUser, CurrentUser};
use crate::models::user::{UserProfile, UserWithCounts};
use crate::response::{ApiResult, Msg, Reply};
use crate::services::user_service::{
    ChangePassword, UpdateUser, UserPage, UserService, UserStats,
};
use crate::validate::JsonBody;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

/// GET /api/users (admin, paginated)
pub async fn find_all(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<UserPage> {
    let page = parse_i64(query.page.as_deref(), 1);
    let limit = parse_i64(query.limit.as_deref(), 10);
    let search = query.search.filter(|s| !s.trim().is_empty());
    let result = UserService::new(state.pool.clone())
        .find_all(page, limit, search)
        .await?;
    Ok(Reply::success(result))
}

/// GET /api/users/me
pub async fn me(user: CurrentUser, State(state): State<AppState>) -> ApiResult<UserWithCounts> {
    let profile = UserService::new(state.pool.clone()).find_one(user.id).await?;
    Ok(Reply::success(profile))
}

/// GET /api/users/me/stats
pub async fn me_stats(user: CurrentUser, State(state): State<AppState>) -> ApiResult<UserStats> {
    let stats = UserService::new(state.pool.clone()).stats(user.id).await?;
    Ok(Reply::success(stats))
}

/// GET /api/users/:id (admin)
pub async fn find_one(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<UserWithCounts> {
    let id = parse_id(&id)?;
    let profile = UserService::new(state.pool.clone()).find_one(id).await?;
    Ok(Reply::success(profile))
}

/// PATCH /api/users/me
pub async fn update_me(
    user: CurrentUser,
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<UpdateUser>,
) -> ApiResult<UserProfile> {
    dto.validate()?;
    let profile = UserService::new(state.pool.clone())
        .update(user.id, dto)
        .await?;
    Ok(Reply::updated(profile))
}

/// PATCH /api/users/me/password
pub async fn change_password(
    user: CurrentUser,
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<ChangePassword>,
) -> ApiResult<Msg> {
    dto.validate()?;
    let msg = UserService::new(state.pool.clone())
        .change_password(user.id, dto)
        .await?;
    Ok(Reply::updated(msg))
}

/// PATCH /api/users/:id (admin)
pub async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<UpdateUser>,
) -> ApiResult<UserProfile> {
    let id = parse_id(&id)?;
    dto.validate()?;
    let profile = UserService::new(state.pool.clone()).update(id, dto).await?;
    Ok(Reply::updated(profile))
}

/// DELETE /api/users/:id (admin)
pub async fn remove(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Msg> {
    let id = parse_id(&id)?;
    let msg = UserService::new(state.pool.clone()).remove(id).await?;
    Ok(Reply::deleted(msg))
}
