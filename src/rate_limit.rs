//! Rate limiting for credential endpoints.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down password guessing
//! and signup spam.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc};

use crate::auth::extract_client_ip;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Default login attempts per minute per IP.
pub const DEFAULT_LOGIN_PER_MINUTE: u32 = 10;

/// Default registrations per minute per IP.
pub const DEFAULT_REGISTER_PER_MINUTE: u32 = 5;

/// Rate limiting configuration for credential endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    pub login: Arc<IpLimiter>,
    pub register: Arc<IpLimiter>,
    /// Key on the first `X-Forwarded-For` entry instead of the socket address
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    /// Create limiters allowing `login_per_minute` and `register_per_minute` per IP.
    /// A zero rate is treated as one request per minute.
    pub fn new(login_per_minute: u32, register_per_minute: u32, trust_forwarded_for: bool) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(Quota::per_minute(at_least_one(
                login_per_minute,
            )))),
            register: Arc::new(RateLimiter::keyed(Quota::per_minute(at_least_one(
                register_per_minute,
            )))),
            trust_forwarded_for,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PER_MINUTE, DEFAULT_REGISTER_PER_MINUTE, false)
    }
}

fn at_least_one(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

async fn limit(
    limiter: &IpLimiter,
    trust_forwarded_for: bool,
    message: &'static str,
    request: Request,
    next: Next,
) -> Response {
    let Some(ip) = extract_client_ip(
        request.headers(),
        request.extensions(),
        trust_forwarded_for,
    ) else {
        tracing::debug!("No client IP available, skipping rate limit");
        return next.run(request).await;
    };

    match limiter.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::warn!(ip = %ip, "Rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "message": message })),
            )
                .into_response()
        }
    }
}

/// Middleware for rate limiting login attempts.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    limit(
        &config.login,
        config.trust_forwarded_for,
        "Too many login attempts. Please wait before trying again.",
        request,
        next,
    )
    .await
}

/// Middleware for rate limiting registrations.
pub async fn rate_limit_register(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    limit(
        &config.register,
        config.trust_forwarded_for,
        "Too many signup attempts. Please wait before trying again.",
        request,
        next,
    )
    .await
}
