//! Success envelope for API responses.
//!
//! Every enveloped result serializes as `{code: 1, data, message, status}`.
//! The status (and its default message) is picked by the handler through the
//! constructor matching its verb: `created` for POST, `updated` for
//! PUT/PATCH, `deleted` for DELETE, `success` otherwise. A handler that must
//! return raw bytes simply returns another `IntoResponse` type instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SuccessStatus {
    Success,
    Created,
    Updated,
    Deleted,
}

impl SuccessStatus {
    fn default_message(self) -> &'static str {
        match self {
            SuccessStatus::Success => "success",
            SuccessStatus::Created => "created",
            SuccessStatus::Updated => "updated",
            SuccessStatus::Deleted => "deleted",
        }
    }

    fn http_status(self) -> StatusCode {
        match self {
            SuccessStatus::Created => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }
}

#[derive(Debug)]
pub struct Reply<T: Serialize> {
    data: T,
    status: SuccessStatus,
    message: Option<String>,
}

impl<T: Serialize> Reply<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status: SuccessStatus::Success,
            message: None,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            data,
            status: SuccessStatus::Created,
            message: None,
        }
    }

    pub fn updated(data: T) -> Self {
        Self {
            data,
            status: SuccessStatus::Updated,
            message: None,
        }
    }

    pub fn deleted(data: T) -> Self {
        Self {
            data,
            status: SuccessStatus::Deleted,
            message: None,
        }
    }

    /// Override the verb-derived default message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn to_envelope(&self) -> Result<serde_json::Value, serde_json::Error> {
        let data = serde_json::to_value(&self.data)?;
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| self.status.default_message().to_string());
        Ok(json!({
            "code": 1,
            "data": data,
            "message": message,
            "status": self.status,
        }))
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self.to_envelope() {
            Ok(envelope) => (self.status.http_status(), Json(envelope)).into_response(),
            Err(e) => {
                tracing::error!("failed to serialize response data: {}", e);
                crate::error::ApiError::internal().into_response()
            }
        }
    }
}

/// Handler result type: enveloped success or taxonomy error.
pub type ApiResult<T> = Result<Reply<T>, crate::error::ApiError>;

/// Plain `{message}` payload used by delete/reset style operations.
#[derive(Debug, Serialize)]
pub struct Msg {
    pub message: String,
}

impl Msg {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_envelope_shape() {
        let reply = Reply::created(Msg::new("hello"));
        let envelope = reply.to_envelope().unwrap();
        assert_eq!(envelope["code"], 1);
        assert_eq!(envelope["status"], "CREATED");
        assert_eq!(envelope["message"], "created");
        assert_eq!(envelope["data"]["message"], "hello");
    }

    #[test]
    fn custom_message_overrides_default() {
        let reply = Reply::success(()).with_message("all good");
        let envelope = reply.to_envelope().unwrap();
        assert_eq!(envelope["message"], "all good");
        assert_eq!(envelope["status"], "SUCCESS");
    }

    #[test]
    fn created_maps_to_http_201() {
        assert_eq!(SuccessStatus::Created.http_status(), StatusCode::CREATED);
        assert_eq!(SuccessStatus::Deleted.http_status(), StatusCode::OK);
    }

    #[test]
    fn pagination_rounds_up() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        let empty = Pagination::new(1, 10, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
