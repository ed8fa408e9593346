use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::category::{CategoryRow, CategoryWithCount, CategoryWithCountRow};
use crate::ordering::{assign_order, ReorderPair};
use crate::response::Msg;
use crate::validate::Validator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub order: Option<i32>,
    pub is_public: Option<bool>,
}

impl CreateCategory {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require("name", &self.name)
            .non_negative("order", self.order);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub order: Option<i32>,
    pub is_public: Option<bool>,
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_opt("name", self.name.as_deref())
            .non_negative("order", self.order);
        v.finish()
    }
}

const WITH_COUNT: &str = "SELECT c.*, \
     (SELECT COUNT(*) FROM nav_items n WHERE n.category_id = c.id) AS nav_item_count \
     FROM categories c";

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateCategory) -> Result<CategoryWithCount, ApiError> {
        let duplicates: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE name = $1")
                .bind(&dto.name)
                .fetch_one(&self.pool)
                .await?;
        if duplicates > 0 {
            return Err(ApiError::conflict("Category name already exists"));
        }

        let current_max: Option<i32> = sqlx::query_scalar("SELECT MAX(sort_order) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        let sort_order = assign_order(dto.order, current_max);

        let row: CategoryRow = sqlx::query_as(
            "INSERT INTO categories (id, name, description, icon, color, sort_order, is_public) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.icon)
        .bind(&dto.color)
        .bind(sort_order)
        .bind(dto.is_public.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(CategoryWithCount {
            category: row.into(),
            nav_item_count: 0,
        })
    }

    pub async fn find_all(&self) -> Result<Vec<CategoryWithCount>, ApiError> {
        let rows: Vec<CategoryWithCountRow> =
            sqlx::query_as(&format!("{WITH_COUNT} ORDER BY c.sort_order ASC"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_public(&self) -> Result<Vec<CategoryWithCount>, ApiError> {
        let rows: Vec<CategoryWithCountRow> = sqlx::query_as(&format!(
            "{WITH_COUNT} WHERE c.is_public = TRUE ORDER BY c.sort_order ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_one(&self, id: Uuid) -> Result<CategoryWithCount, ApiError> {
        let row: Option<CategoryWithCountRow> =
            sqlx::query_as(&format!("{WITH_COUNT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Into::into)
            .ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub async fn update(&self, id: Uuid, dto: UpdateCategory) -> Result<CategoryWithCount, ApiError> {
        self.find_one(id).await?;

        // Renaming onto another category's name is a conflict
        if let Some(name) = &dto.name {
            let clashes: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM categories WHERE name = $1 AND id <> $2",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
            if clashes > 0 {
                return Err(ApiError::conflict("Category name already exists"));
            }
        }

        sqlx::query(
            "UPDATE categories SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                icon = COALESCE($4, icon), \
                color = COALESCE($5, color), \
                sort_order = COALESCE($6, sort_order), \
                is_public = COALESCE($7, is_public), \
                updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.icon)
        .bind(&dto.color)
        .bind(dto.order)
        .bind(dto.is_public)
        .execute(&self.pool)
        .await?;

        self.find_one(id).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<Msg, ApiError> {
        self.find_one(id).await?;

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM nav_items WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if references > 0 {
            return Err(ApiError::conflict(
                "Cannot delete a category that still has navigation items",
            ));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Msg::new("Category deleted"))
    }

    /// Apply all rank updates in one transaction; a missing id aborts and
    /// rolls the whole batch back.
    pub async fn update_order(&self, pairs: Vec<ReorderPair>) -> Result<Msg, ApiError> {
        let mut tx = self.pool.begin().await?;
        for pair in &pairs {
            let result =
                sqlx::query("UPDATE categories SET sort_order = $2, updated_at = now() WHERE id = $1")
                    .bind(pair.id)
                    .bind(pair.order)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(ApiError::not_found("Category not found"));
            }
        }
        tx.commit().await?;
        Ok(Msg::new("Order updated"))
    }
}
