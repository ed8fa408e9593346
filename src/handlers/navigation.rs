use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::categories::validate_pairs;
use super::{parse_bool, parse_i64, parse_id};
use crate::error::ApiError;
use crate::middleware::{AdminUser, CurrentUser, MaybeUser};
use crate::models::nav_item::NavItemDto;
use crate::ordering::ReorderPair;
use crate::response::{ApiResult, Msg, Reply};
use crate::services::navigation_service::{
    CreateNavItem, NavItemFilter, NavItemPage, NavigationService, UpdateNavItem,
};
use crate::validate::JsonBody;
use crate::AppState;

/// Query string shared by the list endpoints. Values arrive as strings and
/// are parsed leniently; only `categoryId` is rejected when malformed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category_id: Option<String>,
    pub is_private: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> Result<NavItemFilter, ApiError> {
        let category_id = match self.category_id.as_deref() {
            Some(raw) => Some(
                parse_id(raw).map_err(|_| ApiError::bad_request("Invalid categoryId format"))?,
            ),
            None => None,
        };
        Ok(NavItemFilter {
            category_id,
            is_private: parse_bool(self.is_private.as_deref()),
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
        })
    }
}

/// POST /api/navigation (auth)
pub async fn create(
    user: CurrentUser,
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CreateNavItem>,
) -> ApiResult<NavItemDto> {
    dto.validate()?;
    let item = NavigationService::new(state.pool.clone())
        .create(dto, Some(user.id))
        .await?;
    Ok(Reply::created(item))
}

/// GET /api/navigation/all (admin, paginated)
pub async fn find_all(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<NavItemPage> {
    let page = parse_i64(query.page.as_deref(), 1);
    let limit = parse_i64(query.limit.as_deref(), 10);
    let filter = query.filter()?;
    let result = NavigationService::new(state.pool.clone())
        .find_all(page, limit, filter)
        .await?;
    Ok(Reply::success(result))
}

/// GET /api/navigation and /api/navigation/public
pub async fn find_public(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<NavItemDto>> {
    let mut filter = query.filter()?;
    filter.is_private = None;
    let items = NavigationService::new(state.pool.clone())
        .find_public(filter)
        .await?;
    Ok(Reply::success(items))
}

/// GET /api/navigation/private (auth)
pub async fn find_private(
    user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<NavItemDto>> {
    let mut filter = query.filter()?;
    filter.is_private = None;
    let items = NavigationService::new(state.pool.clone())
        .find_private(user.id, filter)
        .await?;
    Ok(Reply::success(items))
}

/// GET /api/navigation/:id - private items are only served to their owner
pub async fn find_one(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<NavItemDto> {
    let id = parse_id(&id)?;
    let item = NavigationService::new(state.pool.clone())
        .find_one(id, user.map(|u| u.id))
        .await?;
    Ok(Reply::success(item))
}

/// PATCH /api/navigation/:id (owner or admin)
pub async fn update(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<UpdateNavItem>,
) -> ApiResult<NavItemDto> {
    let id = parse_id(&id)?;
    dto.validate()?;
    let item = NavigationService::new(state.pool.clone())
        .update(id, dto, &user)
        .await?;
    Ok(Reply::updated(item))
}

/// DELETE /api/navigation/:id (owner or admin)
pub async fn remove(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Msg> {
    let id = parse_id(&id)?;
    let msg = NavigationService::new(state.pool.clone())
        .remove(id, &user)
        .await?;
    Ok(Reply::deleted(msg))
}

/// POST /api/navigation/:id/click
pub async fn click(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<NavItemDto> {
    let id = parse_id(&id)?;
    let item = NavigationService::new(state.pool.clone())
        .increment_click(id)
        .await?;
    Ok(Reply::created(item))
}

/// PATCH /api/navigation/batch/order (auth; admins may reorder anything)
pub async fn update_order(
    user: CurrentUser,
    State(state): State<AppState>,
    JsonBody(pairs): JsonBody<Vec<ReorderPair>>,
) -> ApiResult<Msg> {
    validate_pairs(&pairs)?;
    let msg = NavigationService::new(state.pool.clone())
        .update_order(pairs, &user)
        .await?;
    Ok(Reply::updated(msg))
}
