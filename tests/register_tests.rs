mod common;

use axum::http::StatusCode;
use common::{PASSWORD, body_json, create_test_app, create_test_app_with, refresh_cookie, set_cookie};
use serde_json::json;
use tokenwarden::rate_limit::RateLimitConfig;

#[tokio::test]
async fn test_register_success() {
    let app = create_test_app().await;

    let response = app.register("alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"));

    let json = body_json(response).await;
    assert!(json["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["name"], "Alice");
    assert!(json["user"]["id"].as_str().is_some());
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_secure_cookie() {
    let app = create_test_app_with(RateLimitConfig::default(), true).await;

    let response = app.register("alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(set_cookie(&response).unwrap().ends_with("; Secure"));
}

#[tokio::test]
async fn test_register_normalizes_email() {
    let app = create_test_app().await;

    let response = app.register("  Alice@Example.COM ").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_duplicate() {
    let app = create_test_app().await;

    let response = app.register("alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.register("ALICE@example.com").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(refresh_cookie(&response).is_none());

    let json = body_json(response).await;
    assert_eq!(json["message"], "User already exists");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = create_test_app().await;

    let response = app
        .post_json(
            "/user/register",
            json!({
                "name": "  ",
                "email": "not-an-email",
                "password": "short",
                "confirmPassword": "different",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Validation error");
    let errors: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert!(errors.contains(&"Name is required"));
    assert!(errors.contains(&"Invalid email address"));
    assert!(errors.contains(&"Passwords do not match"));
    assert!(errors.len() > 3);
}

#[tokio::test]
async fn test_register_weak_password() {
    let app = create_test_app().await;

    let response = app
        .post_json(
            "/user/register",
            json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "alllowercase",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(!json["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_without_confirmation() {
    let app = create_test_app().await;

    let response = app
        .post_json(
            "/user/register",
            json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_malformed_body() {
    let app = create_test_app().await;

    let response = app
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri("/user/register")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Validation error");
    assert_eq!(json["errors"][0], "Invalid request body");
}
