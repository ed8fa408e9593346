//! Input validation at the binding boundary.
//!
//! Request DTOs expose a `validate()` built on [`Validator`]: field checks
//! accumulate and every failure of a request is aggregated into one
//! `VALIDATION_ERROR` message, so business logic never sees half-validated
//! input. [`JsonBody`] replaces `axum::Json` so malformed payloads are
//! rejected with the same envelope as every other error.

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Collects field errors; `finish` folds them into a single `Validation`
/// error with the messages joined by ", ".
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self
    }

    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.error(format!("{} must not be empty", field));
        }
        self
    }

    pub fn require_opt(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.require(field, value);
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.error(format!("{} must be at least {} characters", field, min));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.error(format!("{} must be a valid email address", field));
        }
        self
    }

    pub fn email_opt(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.email(field, value);
        }
        self
    }

    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        if url::Url::parse(value).is_err() {
            self.error(format!("{} must be a valid URL", field));
        }
        self
    }

    pub fn url_opt(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.url(field, value);
        }
        self
    }

    pub fn range(&mut self, field: &str, value: Option<i32>, min: i32, max: i32) -> &mut Self {
        if let Some(value) = value {
            if value < min || value > max {
                self.error(format!("{} must be between {} and {}", field, min, max));
            }
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i32>) -> &mut Self {
        if let Some(value) = value {
            if value < 0 {
                self.error(format!("{} must be greater than or equal to 0", field));
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.errors.join(", ")))
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// JSON body extractor with enveloped rejections.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_aggregate_into_one_message() {
        let mut v = Validator::new();
        v.require("username", "").email("email", "nope");
        let err = v.finish().unwrap_err();
        let message = err.message().to_string();
        assert!(message.contains("username must not be empty"));
        assert!(message.contains("email must be a valid email address"));
        assert!(message.contains(", "));
    }

    #[test]
    fn clean_input_passes() {
        let mut v = Validator::new();
        v.require("username", "alice")
            .email("email", "alice@example.com")
            .url("url", "https://example.com")
            .range("age", Some(30), 1, 120)
            .non_negative("order", Some(0));
        assert!(v.finish().is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn url_requires_a_scheme() {
        let mut v = Validator::new();
        v.url("url", "example.com");
        assert!(v.finish().is_err());
    }
}
