mod common;

use axum::http::StatusCode;
use common::{PASSWORD, body_json, create_test_app, refresh_cookie};
use serde_json::json;

#[tokio::test]
async fn test_login_success() {
    let app = create_test_app().await;
    let registered = body_json(app.register("alice@example.com").await).await;

    let response = app.login("Alice@Example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(refresh_cookie(&response).is_some());

    let json = body_json(response).await;
    assert!(json["token"].as_str().is_some());
    assert_eq!(json["user"]["id"], registered["user"]["id"]);
    assert_eq!(json["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = create_test_app().await;
    app.register("alice@example.com").await;

    let wrong_password = app.login("alice@example.com", "Wr0ng!Password").await;
    let unknown_email = app.login("bob@example.com", PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(refresh_cookie(&wrong_password).is_none());
    assert!(refresh_cookie(&unknown_email).is_none());

    let wrong_password = body_json(wrong_password).await;
    let unknown_email = body_json(unknown_email).await;
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_validation() {
    let app = create_test_app().await;

    let response = app
        .post_json("/user/login", json!({ "email": "nope" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Validation error");
    assert_eq!(
        json["errors"],
        json!(["Invalid email address", "Password is required"])
    );
}

#[tokio::test]
async fn test_login_does_not_apply_password_rules() {
    let app = create_test_app().await;

    let response = app.login("alice@example.com", "weak").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
