use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::authz::can_modify;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::category::{CategoryDto, CategoryRow};
use crate::models::nav_item::{NavItemDto, NavItemRow};
use crate::models::OwnerRef;
use crate::ordering::{assign_order, ReorderPair};
use crate::response::{Msg, Pagination};
use crate::validate::Validator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateNavItem {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub icon: Option<String>,
    pub favicon: Option<String>,
    pub tags: Option<String>,
    pub category_id: Uuid,
    pub is_private: Option<bool>,
    pub is_public: Option<bool>,
    pub order: Option<i32>,
}

impl CreateNavItem {
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
pub struct UpdateNavItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub favicon: Option<String>,
    pub tags: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_private: Option<bool>,
    pub is_public: Option<bool>,
    pub order: Option<i32>,
}

impl UpdateNavItem {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_opt("title", self.title.as_deref())
            .url_opt("url", self.url.as_deref())
            .non_negative("order", self.order);
        v.finish()
    }
}

/// Explicit filter for list queries; absent fields mean "no constraint".
#[derive(Debug, Default, Clone)]
pub struct NavItemFilter {
    pub category_id: Option<Uuid>,
    pub is_private: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavItemPage {
    pub items: Vec<NavItemDto>,
    pub pagination: Pagination,
}

pub struct NavigationService {
    pool: PgPool,
}

impl NavigationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        dto: CreateNavItem,
        caller_id: Option<Uuid>,
    ) -> Result<NavItemDto, ApiError> {
        let category_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = $1")
                .bind(dto.category_id)
                .fetch_one(&self.pool)
                .await?;
        if category_exists == 0 {
            return Err(ApiError::bad_request("Specified category does not exist"));
        }

        let is_private = dto.is_private.unwrap_or(false);
        if is_private && caller_id.is_none() {
            return Err(ApiError::bad_request(
                "A private navigation item requires an authenticated owner",
            ));
        }
        // Only private items record an owner
        let owner_id = if is_private { caller_id } else { None };

        let current_max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(sort_order) FROM nav_items WHERE category_id = $1")
                .bind(dto.category_id)
                .fetch_one(&self.pool)
                .await?;
        let sort_order = assign_order(dto.order, current_max);

        let row: NavItemRow = sqlx::query_as(
            "INSERT INTO nav_items \
                (id, title, description, url, icon, favicon, tags, category_id, user_id, \
                 is_private, is_public, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.url)
        .bind(&dto.icon)
        .bind(&dto.favicon)
        .bind(&dto.tags)
        .bind(dto.category_id)
        .bind(owner_id)
        .bind(is_private)
        .bind(dto.is_public.unwrap_or(true))
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await?;

        self.hydrate_one(row).await
    }

    pub async fn find_all(
        &self,
        page: i64,
        limit: i64,
        filter: NavItemFilter,
    ) -> Result<NavItemPage, ApiError> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM nav_items WHERE 1 = 1",
        );
        push_filter(&mut count_query, &filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM nav_items WHERE 1 = 1");
        push_filter(&mut query, &filter);
        query
            .push(" ORDER BY sort_order ASC, created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind((page - 1) * limit);
        let rows: Vec<NavItemRow> = query.build_query_as().fetch_all(&self.pool).await?;

        Ok(NavItemPage {
            items: self.hydrate(rows).await?,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn find_public(&self, filter: NavItemFilter) -> Result<Vec<NavItemDto>, ApiError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT * FROM nav_items WHERE is_public = TRUE AND is_private = FALSE",
        );
        push_filter(&mut query, &filter);
        query.push(" ORDER BY sort_order ASC, created_at DESC");
        let rows: Vec<NavItemRow> = query.build_query_as().fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    pub async fn find_private(
        &self,
        owner_id: Uuid,
        filter: NavItemFilter,
    ) -> Result<Vec<NavItemDto>, ApiError> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT * FROM nav_items WHERE is_private = TRUE");
        query.push(" AND user_id = ").push_bind(owner_id);
        push_filter(&mut query, &filter);
        query.push(" ORDER BY sort_order ASC, created_at DESC");
        let rows: Vec<NavItemRow> = query.build_query_as().fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    pub async fn find_one(&self, id: Uuid, viewer: Option<Uuid>) -> Result<NavItemDto, ApiError> {
        let row = self.fetch(id).await?;
        if row.is_private && !viewer.map_or(false, |v| row.user_id == Some(v)) {
            return Err(ApiError::forbidden(
                "You do not have permission to view this private navigation item",
            ));
        }
        self.hydrate_one(row).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateNavItem,
        actor: &CurrentUser,
    ) -> Result<NavItemDto, ApiError> {
        let row = self.fetch(id).await?;
        if !can_modify(actor.id, actor.role, row.user_id) {
            return Err(ApiError::forbidden(
                "You do not have permission to modify this navigation item",
            ));
        }

        if let Some(category_id) = dto.category_id {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;
            if exists == 0 {
                return Err(ApiError::bad_request("Specified category does not exist"));
            }
        }

        let row: NavItemRow = sqlx::query_as(
            "UPDATE nav_items SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                url = COALESCE($4, url), \
                icon = COALESCE($5, icon), \
                favicon = COALESCE($6, favicon), \
                tags = COALESCE($7, tags), \
                category_id = COALESCE($8, category_id), \
                is_private = COALESCE($9, is_private), \
                is_public = COALESCE($10, is_public), \
                sort_order = COALESCE($11, sort_order), \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.url)
        .bind(&dto.icon)
        .bind(&dto.favicon)
        .bind(&dto.tags)
        .bind(dto.category_id)
        .bind(dto.is_private)
        .bind(dto.is_public)
        .bind(dto.order)
        .fetch_one(&self.pool)
        .await?;

        self.hydrate_one(row).await
    }

    pub async fn remove(&self, id: Uuid, actor: &CurrentUser) -> Result<Msg, ApiError> {
        let row = self.fetch(id).await?;
        if !can_modify(actor.id, actor.role, row.user_id) {
            return Err(ApiError::forbidden(
                "You do not have permission to delete this navigation item",
            ));
        }

        sqlx::query("DELETE FROM nav_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Msg::new("Navigation item deleted"))
    }

    pub async fn increment_click(&self, id: Uuid) -> Result<NavItemDto, ApiError> {
        let row: Option<NavItemRow> = sqlx::query_as(
            "UPDATE nav_items SET click_count = click_count + 1, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let row = row.ok_or_else(|| ApiError::not_found("Navigation item not found"))?;
        self.hydrate_one(row).await
    }

    /// Atomic batch reorder. Non-admins must own every target item; the
    /// check runs before any write so a rejected batch changes nothing.
    pub async fn update_order(
        &self,
        pairs: Vec<ReorderPair>,
        actor: &CurrentUser,
    ) -> Result<Msg, ApiError> {
        if !actor.role.is_admin() {
            let ids: Vec<Uuid> = pairs.iter().map(|pair| pair.id).collect();
            let owners: Vec<(Uuid, Option<Uuid>)> =
                sqlx::query_as("SELECT id, user_id FROM nav_items WHERE id = ANY($1)")
                    .bind(&ids)
                    .fetch_all(&self.pool)
                    .await?;
            if owners.iter().any(|(_, owner)| *owner != Some(actor.id)) {
                return Err(ApiError::forbidden(
                    "You do not have permission to reorder other users' navigation items",
                ));
            }
        }

        let mut tx = self.pool.begin().await?;
        for pair in &pairs {
            let result =
                sqlx::query("UPDATE nav_items SET sort_order = $2, updated_at = now() WHERE id = $1")
                    .bind(pair.id)
                    .bind(pair.order)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(ApiError::not_found("Navigation item not found"));
            }
        }
        tx.commit().await?;
        Ok(Msg::new("Order updated"))
    }

    async fn fetch(&self, id: Uuid) -> Result<NavItemRow, ApiError> {
        let row: Option<NavItemRow> = sqlx::query_as("SELECT * FROM nav_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| ApiError::not_found("Navigation item not found"))
    }

    async fn hydrate_one(&self, row: NavItemRow) -> Result<NavItemDto, ApiError> {
        let mut items = self.hydrate(vec![row]).await?;
        Ok(items.remove(0))
    }

    /// Attach categories and owner usernames with follow-up queries.
    async fn hydrate(&self, rows: Vec<NavItemRow>) -> Result<Vec<NavItemDto>, ApiError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let category_ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let owner_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|row| row.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let categories: Vec<CategoryRow> =
            sqlx::query_as("SELECT * FROM categories WHERE id = ANY($1)")
                .bind(&category_ids)
                .fetch_all(&self.pool)
                .await?;
        let categories: HashMap<Uuid, CategoryDto> = categories
            .into_iter()
            .map(|row| (row.id, row.into()))
            .collect();

        let owners: HashMap<Uuid, String> = if owner_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, (Uuid, String)>(
                "SELECT id, username FROM users WHERE id = ANY($1)",
            )
            .bind(&owner_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect()
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let category = categories.get(&row.category_id).cloned();
                let user = row
                    .user_id
                    .and_then(|id| owners.get(&id))
                    .map(|username| OwnerRef {
                        username: username.clone(),
                    });
                NavItemDto::from_row(row, category, user)
            })
            .collect())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &NavItemFilter) {
    if let Some(category_id) = filter.category_id {
        query.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(is_private) = filter.is_private {
        query.push(" AND is_private = ").push_bind(is_private);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR tags ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
