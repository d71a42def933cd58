//! Integration tests for registration, login and token protection

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success() {
    let app = common::TestApp::new().await;

    let email = format!("register_test_{}@example.com", uuid::Uuid::new_v4());
    let body = json!({
        "email": email,
        "password": "SecurePassword123!"
    });

    let (status, response) = app.post("/api/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);

    let response: Value = serde_json::from_str(&response).unwrap();
    assert!(!response["token"].as_str().unwrap().is_empty());
    assert!(uuid::Uuid::parse_str(response["user_id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_stores_hash_not_password() {
    let app = common::TestApp::new().await;

    let email = format!("hash_check_{}@example.com", uuid::Uuid::new_v4());
    let body = json!({ "email": email, "password": "SecurePassword123!" });
    let (status, _) = app.post("/api/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_ne!(stored, "SecurePassword123!");
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email() {
    let app = common::TestApp::new().await;

    let email = format!("duplicate_{}@example.com", uuid::Uuid::new_v4());
    let body = json!({
        "email": email,
        "password": "SecurePassword123!"
    });

    let (status, _) = app.post("/api/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = app.post("/api/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let response: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["code"], "CONFLICT");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_duplicate_registration_creates_one_user() {
    let app = common::TestApp::new().await;

    let email = format!("race_{}@example.com", uuid::Uuid::new_v4());
    let body = json!({ "email": email, "password": "SecurePassword123!" }).to_string();

    let (first, second) = tokio::join!(
        app.post("/api/register", &body),
        app.post("/api/register", &body)
    );
    let mut statuses = [first.0, second.0];
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_invalid_email() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": "not-an-email",
        "password": "SecurePassword123!"
    });

    let (status, _) = app.post("/api/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_weak_password() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": "weak_password@example.com",
        "password": "123"
    });

    let (status, _) = app.post("/api/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_success() {
    let app = common::TestApp::new().await;

    let email = format!("login_test_{}@example.com", uuid::Uuid::new_v4());
    let password = "SecurePassword123!";

    let register_body = json!({
        "email": email,
        "password": password
    });
    let (_, registered) = app.post("/api/register", &register_body.to_string()).await;
    let registered: Value = serde_json::from_str(&registered).unwrap();

    let (status, response) = app.post("/api/login", &register_body.to_string()).await;

    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["user_id"], registered["user_id"]);
    let token = response["token"].as_str().unwrap();

    let (status, profile) = app.get_auth("/api/me", token).await;
    assert_eq!(status, StatusCode::OK);
    let profile: Value = serde_json::from_str(&profile).unwrap();
    assert_eq!(profile["email"], email.as_str());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password_matches_unknown_email() {
    let app = common::TestApp::new().await;

    let email = format!("wrong_pass_{}@example.com", uuid::Uuid::new_v4());

    let register_body = json!({
        "email": email,
        "password": "CorrectPassword123!"
    });
    app.post("/api/register", &register_body.to_string()).await;

    let wrong_password = json!({
        "email": email,
        "password": "WrongPassword123!"
    });
    let (status, wrong_body) = app.post("/api/login", &wrong_password.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown = json!({
        "email": format!("nobody_{}@example.com", uuid::Uuid::new_v4()),
        "password": "WrongPassword123!"
    });
    let (status, unknown_body) = app.post("/api/login", &unknown.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_protected_endpoint_with_forged_token() {
    let app = common::TestApp::new().await;

    let fake_token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIiwiZXhwIjoxfQ.invalid";

    let (status, _) = app.get_auth("/api/me", fake_token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_protected_endpoint_without_token() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/api/me").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Authentication required"));
}
