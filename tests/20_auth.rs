mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::Api;

#[tokio::test]
async fn signup_then_login_then_whoami() -> Result<()> {
    let (api, user) = Api::user("ada").await?;
    assert!(user.get("password_hash").is_none());

    let (status, body) = api.get("/api/user").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user["id"]);
    assert_eq!(body["data"]["theme"], "dark");
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_conflicts() -> Result<()> {
    let api = Api::anonymous().await?;
    let email = format!("dup-{}@example.com", uuid::Uuid::new_v4().simple());
    let body = json!({"username": "dup", "email": email, "password": "secret1"});

    let (status, _) = api.post("/auth/signup", body.clone()).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = api.post("/auth/signup", body).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn invalid_signup_is_a_validation_error() -> Result<()> {
    let api = Api::anonymous().await?;

    let (status, body) = api
        .post("/auth/signup", json!({"username": "x", "email": "nope", "password": "secret1"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let (_, user) = Api::user("bob").await?;
    let api = Api::anonymous().await?;

    let (status, body) = api
        .post("/auth/login", json!({"email": user["email"], "password": "wrong-password"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let api = Api::anonymous().await?;

    let (status, body) = api.get("/api/workspaces").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn theme_and_profile_updates() -> Result<()> {
    let (api, _) = Api::user("carol").await?;

    let (status, body) = api.put("/api/user/theme", json!({"theme": "light"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["theme"], "light");

    let (status, _) = api.put("/api/user/theme", json!({"theme": "sepia"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = api.put("/api/user/profile", json!({"username": "Carol"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "Carol");
    Ok(())
}
