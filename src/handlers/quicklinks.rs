use axum::extract::{Path, State};

use super::categories::validate_pairs;
use super::parse_id;
use crate::middleware::AdminUser;
use crate::models::quick_link::QuickLinkDto;
use crate::ordering::ReorderPair;
use crate::response::{ApiResult, Msg, Reply};
use crate::services::quicklink_service::{CreateQuickLink, QuickLinkService, UpdateQuickLink};
use crate::validate::JsonBody;
use crate::AppState;

/// POST /api/quicklinks (admin)
pub async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CreateQuickLink>,
) -> ApiResult<QuickLinkDto> {
    dto.validate()?;
    let link = QuickLinkService::new(state.pool.clone())
        .create(dto, admin.id)
        .await?;
    Ok(Reply::created(link))
}

/// GET /api/quicklinks/all (admin)
pub async fn find_all(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<QuickLinkDto>> {
    let links = QuickLinkService::new(state.pool.clone()).find_all().await?;
    Ok(Reply::success(links))
}

/// GET /api/quicklinks
pub async fn find_active(State(state): State<AppState>) -> ApiResult<Vec<QuickLinkDto>> {
    let links = QuickLinkService::new(state.pool.clone())
        .find_active()
        .await?;
    Ok(Reply::success(links))
}

/// GET /api/quicklinks/:id
pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<QuickLinkDto> {
    let id = parse_id(&id)?;
    let link = QuickLinkService::new(state.pool.clone()).find_one(id).await?;
    Ok(Reply::success(link))
}

/// PATCH /api/quicklinks/:id (admin)
pub async fn update(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<UpdateQuickLink>,
) -> ApiResult<QuickLinkDto> {
    let id = parse_id(&id)?;
    dto.validate()?;
    let link = QuickLinkService::new(state.pool.clone())
        .update(id, dto, &admin)
        .await?;
    Ok(Reply::updated(link))
}

/// DELETE /api/quicklinks/:id (admin)
pub async fn remove(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Msg> {
    let id = parse_id(&id)?;
    let msg = QuickLinkService::new(state.pool.clone())
        .remove(id, &admin)
        .await?;
    Ok(Reply::deleted(msg))
}

/// PATCH /api/quicklinks/batch/order (admin)
pub async fn update_order(
    _admin: AdminUser,
    State(state): State<AppState>,
    JsonBody(pairs): JsonBody<Vec<ReorderPair>>,
) -> ApiResult<Msg> {
    validate_pairs(&pairs)?;
    let msg = QuickLinkService::new(state.pool.clone())
        .update_order(pairs)
        .await?;
    Ok(Reply::updated(msg))
}

/// PATCH /api/quicklinks/:id/toggle (admin)
pub async fn toggle(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<QuickLinkDto> {
    let id = parse_id(&id)?;
    let link = QuickLinkService::new(state.pool.clone()).toggle(id).await?;
    Ok(Reply::updated(link))
}
