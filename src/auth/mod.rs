pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;
use crate::models::user::Role;

/// Bearer-token claims: identity, display name and role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: Uuid, username: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self {
            id,
            username,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

pub fn generate_token(claims: &Claims) -> Result<String, ApiError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        tracing::error!("JWT_SECRET is not configured");
        return Err(ApiError::internal());
    }
    sign_with_secret(claims, secret)
}

pub fn decode_token(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;
    decode_with_secret(token, secret)
}

pub fn sign_with_secret(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal()
    })
}

pub fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
}

/// 6-digit numeric password-reset code.
pub fn generate_reset_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            id: Uuid::new_v4(),
            username: "alice".into(),
            role: Role::User,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        }
    }

    #[test]
    fn token_round_trip() {
        let claims = claims();
        let token = sign_with_secret(&claims, "test-secret").unwrap();
        let decoded = decode_with_secret(&token, "test-secret").unwrap();
        assert_eq!(decoded.id, claims.id);
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.role, Role::User);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_with_secret(&claims(), "test-secret").unwrap();
        assert!(decode_with_secret(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims();
        expired.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = sign_with_secret(&expired, "test-secret").unwrap();
        assert!(decode_with_secret(&token, "test-secret").is_err());
    }

    #[test]
    fn reset_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
