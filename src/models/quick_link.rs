use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::OwnerRef;

#[derive(Debug, Clone, FromRow)]
pub struct QuickLinkRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickLinkDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub icon: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_active: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<OwnerRef>,
}

impl QuickLinkDto {
    pub fn from_row(row: QuickLinkRow, user: Option<OwnerRef>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            url: row.url,
            icon: row.icon,
            sort_order: row.sort_order,
            is_active: row.is_active,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user,
        }
    }
}
