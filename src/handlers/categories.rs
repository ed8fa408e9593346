use axum::extract::{Path, State};

use super::parse_id;
use crate::middleware::AdminUser;
use crate::models::category::CategoryWithCount;
use crate::ordering::ReorderPair;
use crate::response::{ApiResult, Msg, Reply};
use crate::services::category_service::{CategoryService, CreateCategory, UpdateCategory};
use crate::validate::{JsonBody, Validator};
use crate::AppState;

/// POST /api/categories (admin)
pub async fn create(
    _admin: AdminUser,
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CreateCategory>,
) -> ApiResult<CategoryWithCount> {
    dto.validate()?;
    let category = CategoryService::new(state.pool.clone()).create(dto).await?;
    Ok(Reply::created(category))
}

/// GET /api/categories/all (admin)
pub async fn find_all(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<CategoryWithCount>> {
    let categories = CategoryService::new(state.pool.clone()).find_all().await?;
    Ok(Reply::success(categories))
}

/// GET /api/categories
pub async fn find_public(State(state): State<AppState>) -> ApiResult<Vec<CategoryWithCount>> {
    let categories = CategoryService::new(state.pool.clone()).find_public().await?;
    Ok(Reply::success(categories))
}

/// GET /api/categories/:id
pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CategoryWithCount> {
    let id = parse_id(&id)?;
    let category = CategoryService::new(state.pool.clone()).find_one(id).await?;
    Ok(Reply::success(category))
}

/// PATCH /api/categories/:id (admin)
pub async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<UpdateCategory>,
) -> ApiResult<CategoryWithCount> {
    let id = parse_id(&id)?;
    dto.validate()?;
    let category = CategoryService::new(state.pool.clone())
        .update(id, dto)
        .await?;
    Ok(Reply::updated(category))
}

/// DELETE /api/categories/:id (admin)
pub async fn remove(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Msg> {
    let id = parse_id(&id)?;
    let msg = CategoryService::new(state.pool.clone()).remove(id).await?;
    Ok(Reply::deleted(msg))
}

/// PATCH /api/categories/batch/order (admin)
pub async fn update_order(
    _admin: AdminUser,
    State(state): State<AppState>,
    JsonBody(pairs): JsonBody<Vec<ReorderPair>>,
) -> ApiResult<Msg> {
    validate_pairs(&pairs)?;
    let msg = CategoryService::new(state.pool.clone())
        .update_order(pairs)
        .await?;
    Ok(Reply::updated(msg))
}

pub(crate) fn validate_pairs(pairs: &[ReorderPair]) -> Result<(), crate::error::ApiError> {
    let mut v = Validator::new();
    if pairs.is_empty() {
        v.error("order payload must not be empty");
    }
    for pair in pairs {
        v.non_negative("order", Some(pair.order));
    }
    v.finish()
}
