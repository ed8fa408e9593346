use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::models::user::{UserProfile, UserRow, UserWithCounts};
use crate::response::{Msg, Pagination};
use crate::validate::Validator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
}

impl UpdateUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_opt("username", self.username.as_deref())
            .email_opt("email", self.email.as_deref())
            .range("age", self.age, 1, 120);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePassword {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require("currentPassword", &self.current_password)
            .require("newPassword", &self.new_password)
            .min_len("newPassword", &self.new_password, 6)
            .require("confirmPassword", &self.confirm_password);
        v.finish()
    }
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<UserWithCounts>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user: UserWithCounts,
    pub stats: StatsBreakdown,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBreakdown {
    pub nav_items: PrivatePublicCount,
    pub quick_links: ActiveInactiveCount,
}

#[derive(Debug, Serialize)]
pub struct PrivatePublicCount {
    pub private: i64,
    pub public: i64,
}

#[derive(Debug, Serialize)]
pub struct ActiveInactiveCount {
    pub active: i64,
    pub inactive: i64,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(
        &self,
        page: i64,
        limit: i64,
        search: Option<String>,
    ) -> Result<UserPage, ApiError> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
        push_search(&mut count_query, search.as_deref());
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE 1 = 1");
        push_search(&mut query, search.as_deref());
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind((page - 1) * limit);
        let rows: Vec<UserRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let (nav_counts, link_counts) = self.counts_for(&ids).await?;

        let users = rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                UserWithCounts {
                    profile: row.into(),
                    nav_item_count: nav_counts.get(&id).copied().unwrap_or(0),
                    quick_link_count: link_counts.get(&id).copied().unwrap_or(0),
                }
            })
            .collect();

        Ok(UserPage {
            users,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn find_one(&self, id: Uuid) -> Result<UserWithCounts, ApiError> {
        let row = self.fetch(id).await?;

        let (nav_item_count, quick_link_count) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM nav_items WHERE user_id = $1")
                .bind(id)
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quick_links WHERE user_id = $1")
                .bind(id)
                .fetch_one(&self.pool),
        )?;

        Ok(UserWithCounts {
            profile: row.into(),
            nav_item_count,
            quick_link_count,
        })
    }

    pub async fn update(&self, id: Uuid, dto: UpdateUser) -> Result<UserProfile, ApiError> {
        let current = self.fetch(id).await?;

        if let Some(username) = &dto.username {
            if username != &current.username {
                let taken: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
                        .bind(username)
                        .fetch_one(&self.pool)
                        .await?;
                if taken > 0 {
                    return Err(ApiError::conflict("Username already taken"));
                }
            }
        }

        if let Some(email) = &dto.email {
            if email != &current.email {
                let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
                    .bind(email)
                    .fetch_one(&self.pool)
                    .await?;
                if taken > 0 {
                    return Err(ApiError::conflict("Email already registered"));
                }
            }
        }

        let row: UserRow = sqlx::query_as(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                email = COALESCE($3, email), \
                avatar = COALESCE($4, avatar), \
                age = COALESCE($5, age), \
                gender = COALESCE($6, gender), \
                bio = COALESCE($7, bio), \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&dto.avatar)
        .bind(dto.age)
        .bind(&dto.gender)
        .bind(&dto.bio)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn change_password(&self, id: Uuid, dto: ChangePassword) -> Result<Msg, ApiError> {
        if dto.new_password != dto.confirm_password {
            return Err(ApiError::bad_request(
                "New password and confirmation do not match",
            ));
        }

        let user = self.fetch(id).await?;
        if !verify_password(&dto.current_password, &user.password_hash) {
            return Err(ApiError::unauthorized("Current password is incorrect"));
        }

        let password_hash = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(Msg::new("Password changed"))
    }

    pub async fn remove(&self, id: Uuid) -> Result<Msg, ApiError> {
        self.fetch(id).await?;

        let (nav_items, quick_links) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM nav_items WHERE user_id = $1")
                .bind(id)
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quick_links WHERE user_id = $1")
                .bind(id)
                .fetch_one(&self.pool),
        )?;
        if nav_items > 0 || quick_links > 0 {
            return Err(ApiError::conflict(
                "Cannot delete a user that still owns navigation items or quick links",
            ));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Msg::new("User deleted"))
    }

    pub async fn stats(&self, id: Uuid) -> Result<UserStats, ApiError> {
        let user = self.find_one(id).await?;

        let ((private, public), (active, inactive)) = tokio::try_join!(
            sqlx::query_as::<_, (i64, i64)>(
                "SELECT COUNT(*) FILTER (WHERE is_private), \
                        COUNT(*) FILTER (WHERE NOT is_private) \
                 FROM nav_items WHERE user_id = $1",
            )
            .bind(id)
            .fetch_one(&self.pool),
            sqlx::query_as::<_, (i64, i64)>(
                "SELECT COUNT(*) FILTER (WHERE is_active), \
                        COUNT(*) FILTER (WHERE NOT is_active) \
                 FROM quick_links WHERE user_id = $1",
            )
            .bind(id)
            .fetch_one(&self.pool),
        )?;

        Ok(UserStats {
            user,
            stats: StatsBreakdown {
                nav_items: PrivatePublicCount { private, public },
                quick_links: ActiveInactiveCount { active, inactive },
            },
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<UserRow, ApiError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| ApiError::not_found("User not found"))
    }

    async fn counts_for(
        &self,
        ids: &[Uuid],
    ) -> Result<(HashMap<Uuid, i64>, HashMap<Uuid, i64>), ApiError> {
        if ids.is_empty() {
            return Ok((HashMap::new(), HashMap::new()));
        }
        let ids = ids.to_vec();
        let (nav_counts, link_counts) = tokio::try_join!(
            sqlx::query_as::<_, (Uuid, i64)>(
                "SELECT user_id, COUNT(*) FROM nav_items \
                 WHERE user_id = ANY($1) GROUP BY user_id",
            )
            .bind(&ids)
            .fetch_all(&self.pool),
            sqlx::query_as::<_, (Uuid, i64)>(
                "SELECT user_id, COUNT(*) FROM quick_links \
                 WHERE user_id = ANY($1) GROUP BY user_id",
            )
            .bind(&ids)
            .fetch_all(&self.pool),
        )?;
        Ok((
            nav_counts.into_iter().collect(),
            link_counts.into_iter().collect(),
        ))
    }
}

fn push_search(query: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
