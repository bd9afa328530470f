#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use tokenwarden::{
    ServerConfig, create_app, db::Database, issuer::ExpiryPolicy, rate_limit::RateLimitConfig,
};
use tower::ServiceExt;
use url::Url;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-0123456789abcdef";
pub const PASSWORD: &str = "Str0ng!Passw0rd";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
}

/// Build an app backed by a fresh in-memory database.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(RateLimitConfig::default(), false).await
}

pub async fn create_test_app_with(rate_limit: RateLimitConfig, secure_cookies: bool) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        access_secret: ACCESS_SECRET.to_vec(),
        refresh_secret: REFRESH_SECRET.to_vec(),
        expiry: ExpiryPolicy::default(),
        cors_origin: Url::parse("http://localhost:5173").expect("Invalid URL"),
        secure_cookies,
        rate_limit,
    };
    TestApp {
        app: create_app(&config),
        db,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn register(&self, email: &str) -> Response<Body> {
        self.post_json(
            "/user/register",
            json!({
                "name": "Alice",
                "email": email,
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response<Body> {
        self.post_json(
            "/user/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri("/user/refresh");
        if let Some(token) = refresh_token {
            builder = builder.header(header::COOKIE, format!("refreshToken={}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn profile(&self, authorization: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri("/user/");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Register `email` and return (access token, refresh token).
    pub async fn session(&self, email: &str) -> (String, String) {
        let response = self.register(email).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let refresh = refresh_cookie(&response).expect("Missing refresh cookie");
        let json = body_json(response).await;
        (json["token"].as_str().unwrap().to_string(), refresh)
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Full `Set-Cookie` header value, if any.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

/// Refresh token carried by the `Set-Cookie` header, if any.
pub fn refresh_cookie(response: &Response<Body>) -> Option<String> {
    let cookie = set_cookie(response)?;
    let value = cookie.strip_prefix("refreshToken=")?.split(';').next()?;
    (!value.is_empty()).then(|| value.to_string())
}
