use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_reset_code, generate_token, Claims};
use crate::config;
use crate::error::ApiError;
use crate::mail::Mailer;
use crate::models::user::{Role, UserProfile, UserRow};
use crate::response::Msg;
use crate::validate::Validator;

// Unknown username and wrong password must be indistinguishable
const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require("username", &self.username)
            .email("email", &self.email)
            .require("password", &self.password)
            .min_len("password", &self.password, 6);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require("username", &self.username)
            .require("password", &self.password);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ForgotPasswordRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.email("email", &self.email);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require("token", &self.token)
            .require("newPassword", &self.new_password)
            .min_len("newPassword", &self.new_password, 6);
        v.finish()
    }
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserProfile,
    pub token: String,
}

pub struct AuthService {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    pub async fn register(&self, dto: RegisterRequest) -> Result<AuthPayload, ApiError> {
        let username_taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(&dto.username)
                .fetch_one(&self.pool)
                .await?;
        if username_taken > 0 {
            return Err(ApiError::conflict("Username already taken"));
        }

        let email_taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_one(&self.pool)
            .await?;
        if email_taken > 0 {
            return Err(ApiError::conflict("Email already registered"));
        }

        let password_hash = hash_password(&dto.password)?;
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (id, username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(Role::User.as_str())
        .fetch_one(&self.pool)
        .await?;

        self.payload(row)
    }

    pub async fn login(&self, dto: LoginRequest) -> Result<AuthPayload, ApiError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(&dto.username)
            .fetch_optional(&self.pool)
            .await?;
        let row = row.ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(&dto.password, &row.password_hash) {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        self.payload(row)
    }

    pub async fn forgot_password(&self, dto: ForgotPasswordRequest) -> Result<Msg, ApiError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(&self.pool)
            .await?;
        let row = row.ok_or_else(|| ApiError::not_found("Email is not registered"))?;

        let code = generate_reset_code();
        let ttl = config::config().security.reset_code_ttl_minutes;
        let expiry = Utc::now() + Duration::minutes(ttl);

        sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expiry = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(row.id)
        .bind(&code)
        .bind(expiry)
        .execute(&self.pool)
        .await?;

        self.mailer.send_password_reset(&row.email, &code).await?;

        Ok(Msg::new("Password reset email sent"))
    }

    pub async fn reset_password(&self, dto: ResetPasswordRequest) -> Result<Msg, ApiError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT * FROM users WHERE reset_token = $1 AND reset_token_expiry > now()",
        )
        .bind(&dto.token)
        .fetch_optional(&self.pool)
        .await?;
        // Unknown and expired tokens are the same failure; a consumed token is
        // nulled below, so reuse lands here too
        let row = row.ok_or_else(|| ApiError::bad_request("Reset code is invalid or has expired"))?;

        let password_hash = hash_password(&dto.new_password)?;
        sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token = NULL, \
             reset_token_expiry = NULL, updated_at = now() WHERE id = $1",
        )
        .bind(row.id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        Ok(Msg::new("Password reset successful"))
    }

    pub async fn current_user(&self, id: Uuid) -> Result<UserProfile, ApiError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Into::into)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    fn payload(&self, row: UserRow) -> Result<AuthPayload, ApiError> {
        let claims = Claims::new(row.id, row.username.clone(), row.role());
        let token = generate_token(&claims)?;
        Ok(AuthPayload {
            user: row.into(),
            token,
        })
    }
}
