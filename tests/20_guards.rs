mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use uuid::Uuid;

use navhub::auth::{sign_with_secret, Claims};
use navhub::models::user::Role;

fn token_for(role: Role) -> String {
    let now = Utc::now();
    let claims = Claims {
        id: Uuid::new_v4(),
        username: "itest".into(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    };
    sign_with_secret(&claims, common::JWT_SECRET).expect("sign test token")
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], 0);
    assert!(body["data"].is_null());
    assert_eq!(body["status"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/users/me", server.base_url))
        .header("Authorization", "Bearer not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_regular_users() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Role gate runs before any handler logic, so no database is needed
    let res = client
        .post(format!("{}/api/categories", server.base_url))
        .header("Authorization", format!("Bearer {}", token_for(Role::User)))
        .json(&serde_json::json!({ "name": "Dev" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], 0);
    assert_eq!(body["status"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn users_listing_is_admin_only() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/users", server.base_url))
        .header("Authorization", format!("Bearer {}", token_for(Role::User)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn writes_require_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for (method, path) in [
        ("POST", "/api/navigation"),
        ("PATCH", "/api/navigation/batch/order"),
        ("POST", "/api/quicklinks"),
        ("PATCH", "/api/categories/batch/order"),
    ] {
        let url = format!("{}{}", server.base_url, path);
        let req = match method {
            "POST" => client.post(&url),
            _ => client.patch(&url),
        };
        let res = req.json(&serde_json::json!([])).send().await?;
        assert_eq!(
            res.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should require a token",
            method,
            path
        );
    }
    Ok(())
}
