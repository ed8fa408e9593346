use axum::extract::State;

use crate::middleware::CurrentUser;
use crate::models::user::UserProfile;
use crate::response::{ApiResult, Msg, Reply};
use crate::services::auth_service::{
    AuthPayload, AuthService, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};
use crate::validate::JsonBody;
use crate::AppState;

fn service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.mailer.clone())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    dto.validate()?;
    let payload = service(&state).register(dto).await?;
    Ok(Reply::created(payload))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<LoginRequest>,
) -> ApiResult<AuthPayload> {
    dto.validate()?;
    let payload = service(&state).login(dto).await?;
    Ok(Reply::created(payload))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<ForgotPasswordRequest>,
) -> ApiResult<Msg> {
    dto.validate()?;
    let msg = service(&state).forgot_password(dto).await?;
    Ok(Reply::created(msg))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<ResetPasswordRequest>,
) -> ApiResult<Msg> {
    dto.validate()?;
    let msg = service(&state).reset_password(dto).await?;
    Ok(Reply::created(msg))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<UserProfile> {
    let profile = service(&state).current_user(user.id).await?;
    Ok(Reply::success(profile))
}
