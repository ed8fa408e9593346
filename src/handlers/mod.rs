use uuid::Uuid;

use crate::error::ApiError;

pub mod auth;
pub mod categories;
pub mod navigation;
pub mod quicklinks;
pub mod users;

/// Parse a path segment as a UUID, rejecting with the error envelope instead
/// of the extractor's plain-text response.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid id format"))
}

/// Parse an optional `true`/`false` query value; anything else means
/// "no constraint", matching how the original API read its query strings.
pub(crate) fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Parse an optional numeric query value, falling back to a default.
pub(crate) fn parse_i64(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id("123e4567-e89b-12d3-a456-426614174000").is_ok());
    }

    #[test]
    fn parse_bool_is_strict() {
        assert_eq!(parse_bool(Some("true")), Some(true));
        assert_eq!(parse_bool(Some("false")), Some(false));
        assert_eq!(parse_bool(Some("yes")), None);
        assert_eq!(parse_bool(None), None);
    }

    #[test]
    fn parse_i64_falls_back() {
        assert_eq!(parse_i64(Some("5"), 1), 5);
        assert_eq!(parse_i64(Some("abc"), 1), 1);
        assert_eq!(parse_i64(None, 10), 10);
    }
}
