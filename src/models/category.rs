use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row plus the number of nav items referencing it (correlated subquery).
#[derive(Debug, Clone, FromRow)]
pub struct CategoryWithCountRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub nav_item_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for CategoryDto {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            icon: row.icon,
            color: row.color,
            sort_order: row.sort_order,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub nav_item_count: i64,
}

impl From<CategoryWithCountRow> for CategoryWithCount {
    fn from(row: CategoryWithCountRow) -> Self {
        Self {
            category: CategoryDto {
                id: row.id,
                name: row.name,
                description: row.description,
                icon: row.icon,
                color: row.color,
                sort_order: row.sort_order,
                is_public: row.is_public,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            nav_item_count: row.nav_item_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_serializes_as_order() {
        let dto = CategoryDto {
            id: Uuid::new_v4(),
            name: "Dev".into(),
            description: None,
            icon: None,
            color: None,
            sort_order: 3,
            is_public: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["order"], 3);
        assert!(value.get("sortOrder").is_none());
        assert_eq!(value["isPublic"], true);
    }
}
