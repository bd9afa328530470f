mod common;

use axum::http::StatusCode;
use common::{ACCESS_SECRET, REFRESH_SECRET, body_json, create_test_app, refresh_cookie, set_cookie};
use tokenwarden::jwt::{Subject, TokenClaims, TokenClass, TokenCodec, now_secs};

#[tokio::test]
async fn test_profile_requires_token() {
    let app = create_test_app().await;

    let response = app.profile(None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "No token provided");

    let response = app.profile(Some("Basic abc")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "No token provided");
}

#[tokio::test]
async fn test_profile_rejects_invalid_token() {
    let app = create_test_app().await;

    let response = app.profile(Some("Bearer not.a.jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid token");
}

#[tokio::test]
async fn test_profile_rejects_expired_token() {
    let app = create_test_app().await;
    let registered = body_json(app.register("alice@example.com").await).await;
    let subject = Subject::new(registered["user"]["id"].as_str().unwrap());

    let codec = TokenCodec::new(TokenClass::Access, ACCESS_SECRET);
    let issued = now_secs().unwrap() - 1000;
    let expired = codec
        .encode(&TokenClaims::new(subject, TokenClass::Access, issued, 10).unwrap())
        .unwrap();

    let response = app.profile(Some(&format!("Bearer {}", expired))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid token");
}

#[tokio::test]
async fn test_profile_with_access_token() {
    let app = create_test_app().await;
    let (access, _) = app.session("alice@example.com").await;

    let response = app.profile(Some(&format!("Bearer {}", access))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["name"], "Alice");
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = create_test_app().await;
    let (_, refresh) = app.session("alice@example.com").await;

    let response = app.profile(Some(&format!("Bearer {}", refresh))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid token");
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = create_test_app().await;
    let (access, _) = app.session("alice@example.com").await;

    let response = app.refresh(Some(&access)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_profile_of_deleted_user() {
    let app = create_test_app().await;
    let (access, _) = app.session("alice@example.com").await;

    sqlx::query("DELETE FROM users")
        .execute(app.db.pool())
        .await
        .unwrap();

    let response = app.profile(Some(&format!("Bearer {}", access))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = create_test_app().await;
    let (access, refresh) = app.session("alice@example.com").await;

    let response = app.refresh(Some(&refresh)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let rotated = refresh_cookie(&response).unwrap();
    assert_ne!(rotated, refresh);
    assert!(set_cookie(&response).unwrap().contains("Max-Age=604800"));

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Tokens refreshed successfully");
    assert_eq!(json["user"]["email"], "alice@example.com");
    let new_access = json["token"].as_str().unwrap();
    assert_ne!(new_access, access);

    let response = app.profile(Some(&format!("Bearer {}", new_access))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.refresh(Some(&rotated)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = create_test_app().await;

    let response = app.refresh(None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Refresh token required");
}

#[tokio::test]
async fn test_refresh_with_invalid_token() {
    let app = create_test_app().await;

    let response = app.refresh(Some("garbage")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("refreshToken=;"));
    assert!(cookie.contains("Max-Age=0"));

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_with_expired_token() {
    let app = create_test_app().await;
    let registered = body_json(app.register("alice@example.com").await).await;
    let subject = Subject::new(registered["user"]["id"].as_str().unwrap());

    let codec = TokenCodec::new(TokenClass::Refresh, REFRESH_SECRET);
    let issued = now_secs().unwrap() - 1000;
    let expired = codec
        .encode(&TokenClaims::new(subject, TokenClass::Refresh, issued, 10).unwrap())
        .unwrap();

    let response = app.refresh(Some(&expired)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));

    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_refresh_for_deleted_user() {
    let app = create_test_app().await;
    let (_, refresh) = app.session("alice@example.com").await;

    sqlx::query("DELETE FROM users")
        .execute(app.db.pool())
        .await
        .unwrap();

    let response = app.refresh(Some(&refresh)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = create_test_app().await;

    let response = app.post_json("/user/logout", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("refreshToken=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert_eq!(json["message"], "Logged out successfully");
}
