mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn register_aggregates_field_errors() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&serde_json::json!({
            "username": "",
            "email": "not-an-email",
            "password": "123"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], 0);
    assert_eq!(body["status"], "VALIDATION_ERROR");
    let message = body["message"].as_str().unwrap();
    // One message carrying every field failure
    assert!(message.contains("username"));
    assert!(message.contains("email"));
    assert!(message.contains("password"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_enveloped() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], 0);
    assert_eq!(body["status"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&serde_json::json!({
            "username": "alice",
            "password": "secret1",
            "extra": true
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn reset_password_requires_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/reset-password", server.base_url))
        .json(&serde_json::json!({ "token": "", "newPassword": "longenough" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/categories/not-a-uuid", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], 0);
    assert_eq!(body["status"], "BAD_REQUEST");
    assert_eq!(body["message"], "Invalid id format");
    Ok(())
}
