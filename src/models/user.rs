use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User role stored as text in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Anything that is not exactly `ADMIN` is treated as a regular user.
    pub fn from_db(raw: &str) -> Self {
        if raw == "ADMIN" {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Full database row, including credential fields. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub avatar: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Role {
        Role::from_db(&self.role)
    }
}

/// Wire-format profile. Password hash and reset-token fields are stripped
/// here and can never leak into a response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        let role = row.role();
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            role,
            avatar: row.avatar,
            age: row.age,
            gender: row.gender,
            bio: row.bio,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Profile plus owned-resource counts, for admin listings and `/users/me`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithCounts {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub nav_item_count: i64,
    pub quick_link_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_from_db_text() {
        assert_eq!(Role::from_db("ADMIN"), Role::Admin);
        assert_eq!(Role::from_db("USER"), Role::User);
        assert_eq!(Role::from_db("something-else"), Role::User);
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "ADMIN");
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "USER");
    }

    #[test]
    fn profile_never_carries_credentials() {
        let value = serde_json::to_value(UserProfile {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            role: Role::User,
            avatar: None,
            age: None,
            gender: None,
            bio: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("resetToken").is_none());
        assert_eq!(value["role"], "USER");
    }
}
