use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::category::CategoryDto;
use super::OwnerRef;

#[derive(Debug, Clone, FromRow)]
pub struct NavItemRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub icon: Option<String>,
    pub favicon: Option<String>,
    pub tags: Option<String>,
    pub category_id: Uuid,
    pub user_id: Option<Uuid>,
    pub is_private: bool,
    pub is_public: bool,
    pub sort_order: i32,
    pub click_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire format: tags split to a list, category and owner embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItemDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub icon: Option<String>,
    pub favicon: Option<String>,
    pub tags: Vec<String>,
    pub category_id: Uuid,
    pub user_id: Option<Uuid>,
    pub is_private: bool,
    pub is_public: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub click_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategoryDto>,
    pub user: Option<OwnerRef>,
}

impl NavItemDto {
    pub fn from_row(row: NavItemRow, category: Option<CategoryDto>, user: Option<OwnerRef>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            url: row.url,
            icon: row.icon,
            favicon: row.favicon,
            tags: split_tags(row.tags.as_deref()),
            category_id: row.category_id,
            user_id: row.user_id,
            is_private: row.is_private,
            is_public: row.is_public,
            sort_order: row.sort_order,
            click_count: row.click_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category,
            user,
        }
    }
}

/// Split a comma-joined tag string into trimmed, non-empty tags.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_split_and_trim() {
        assert_eq!(
            split_tags(Some("rust, web ,api")),
            vec!["rust", "web", "api"]
        );
    }

    #[test]
    fn empty_tags_yield_empty_list() {
        assert!(split_tags(None).is_empty());
        assert!(split_tags(Some("")).is_empty());
        assert!(split_tags(Some(" , ,")).is_empty());
    }
}
