use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::can_modify;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::quick_link::{QuickLinkDto, QuickLinkRow};
use crate::models::OwnerRef;
use crate::ordering::{assign_order, ReorderPair};
use crate::response::Msg;
use crate::validate::Validator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateQuickLink {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub icon: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CreateQuickLink {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require("title", &self.title)
            .url("url", &self.url)
            .non_negative("order", self.order);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateQuickLink {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateQuickLink {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_opt("title", self.title.as_deref())
            .url_opt("url", self.url.as_deref())
            .non_negative("order", self.order);
        v.finish()
    }
}

pub struct QuickLinkService {
    pool: PgPool,
}

impl QuickLinkService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        dto: CreateQuickLink,
        owner_id: Uuid,
    ) -> Result<QuickLinkDto, ApiError> {
        let current_max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(sort_order) FROM quick_links")
                .fetch_one(&self.pool)
                .await?;
        let sort_order = assign_order(dto.order, current_max);

        let row: QuickLinkRow = sqlx::query_as(
            "INSERT INTO quick_links \
                (id, title, description, url, icon, sort_order, is_active, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.url)
        .bind(&dto.icon)
        .bind(sort_order)
        .bind(dto.is_active.unwrap_or(true))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        self.hydrate_one(row).await
    }

    pub async fn find_all(&self) -> Result<Vec<QuickLinkDto>, ApiError> {
        let rows: Vec<QuickLinkRow> =
            sqlx::query_as("SELECT * FROM quick_links ORDER BY sort_order ASC")
                .fetch_all(&self.pool)
                .await?;
        self.hydrate(rows).await
    }

    pub async fn find_active(&self) -> Result<Vec<QuickLinkDto>, ApiError> {
        let rows: Vec<QuickLinkRow> = sqlx::query_as(
            "SELECT * FROM quick_links WHERE is_active = TRUE ORDER BY sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<QuickLinkDto, ApiError> {
        let row = self.fetch(id).await?;
        self.hydrate_one(row).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateQuickLink,
        actor: &CurrentUser,
    ) -> Result<QuickLinkDto, ApiError> {
        let row = self.fetch(id).await?;
        if !can_modify(actor.id, actor.role, Some(row.user_id)) {
            return Err(ApiError::forbidden(
                "You do not have permission to modify this quick link",
            ));
        }

        let row: QuickLinkRow = sqlx::query_as(
            "UPDATE quick_links SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                url = COALESCE($4, url), \
                icon = COALESCE($5, icon), \
                sort_order = COALESCE($6, sort_order), \
                is_active = COALESCE($7, is_active), \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.url)
        .bind(&dto.icon)
        .bind(dto.order)
        .bind(dto.is_active)
        .fetch_one(&self.pool)
        .await?;

        self.hydrate_one(row).await
    }

    pub async fn remove(&self, id: Uuid, actor: &CurrentUser) -> Result<Msg, ApiError> {
        let row = self.fetch(id).await?;
        if !can_modify(actor.id, actor.role, Some(row.user_id)) {
            return Err(ApiError::forbidden(
                "You do not have permission to delete this quick link",
            ));
        }

        sqlx::query("DELETE FROM quick_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Msg::new("Quick link deleted"))
    }

    pub async fn update_order(&self, pairs: Vec<ReorderPair>) -> Result<Msg, ApiError> {
        let mut tx = self.pool.begin().await?;
        for pair in &pairs {
            let result = sqlx::query(
                "UPDATE quick_links SET sort_order = $2, updated_at = now() WHERE id = $1",
            )
            .bind(pair.id)
            .bind(pair.order)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(ApiError::not_found("Quick link not found"));
            }
        }
        tx.commit().await?;
        Ok(Msg::new("Order updated"))
    }

    pub async fn toggle(&self, id: Uuid) -> Result<QuickLinkDto, ApiError> {
        self.fetch(id).await?;
        let row: QuickLinkRow = sqlx::query_as(
            "UPDATE quick_links SET is_active = NOT is_active, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        self.hydrate_one(row).await
    }

    async fn fetch(&self, id: Uuid) -> Result<QuickLinkRow, ApiError> {
        let row: Option<QuickLinkRow> = sqlx::query_as("SELECT * FROM quick_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| ApiError::not_found("Quick link not found"))
    }

    async fn hydrate_one(&self, row: QuickLinkRow) -> Result<QuickLinkDto, ApiError> {
        let mut links = self.hydrate(vec![row]).await?;
        Ok(links.remove(0))
    }

    async fn hydrate(&self, rows: Vec<QuickLinkRow>) -> Result<Vec<QuickLinkDto>, ApiError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let owner_ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let owners: HashMap<Uuid, String> =
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, username FROM users WHERE id = ANY($1)")
                .bind(&owner_ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let user = owners.get(&row.user_id).map(|username| OwnerRef {
                    username: username.clone(),
                });
                QuickLinkDto::from_row(row, user)
            })
            .collect())
    }
}
