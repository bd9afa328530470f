//! User endpoints.
//!
//! - POST `/user/register` - Create an account and start a session
//! - POST `/user/login` - Start a session with email and password
//! - POST `/user/logout` - Clear the refresh cookie
//! - GET `/user/refresh` - Exchange the refresh cookie for a new token pair (rotation)
//! - GET `/user/` - Profile of the bearer of the access token

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt};
use super::validate::{LoginRequest, RegisterRequest, validate_login, validate_register};
use crate::auth::{
    Auth, AuthError, CookiePolicy, CredentialFlow, REFRESH_COOKIE_NAME, RefreshCoordinator,
    Session, get_cookie,
};
use crate::db::{Database, SanitizedUser};
use crate::impl_has_auth_backend;
use crate::issuer::TokenIssuer;
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_register};

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub tokens: Arc<TokenIssuer>,
    pub cookies: CookiePolicy,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    let register_router = Router::new()
        .route("/user/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_register,
        ));

    let login_router = Router::new()
        .route("/user/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_login,
        ));

    let session_router = Router::new()
        .route("/user/logout", post(logout))
        .route("/user/refresh", get(refresh))
        .route("/user", get(profile))
        .route("/user/", get(profile))
        .with_state(state);

    Router::new()
        .merge(register_router)
        .merge(login_router)
        .merge(session_router)
}

#[derive(Serialize)]
struct SessionResponse {
    token: String,
    user: SanitizedUser,
}

#[derive(Serialize)]
struct RefreshResponse {
    success: bool,
    message: &'static str,
    token: String,
    user: SanitizedUser,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Build the `201`/`200` session response: access token in the body, refresh token in the cookie.
fn session_response(
    status: StatusCode,
    session: Session,
    cookies: CookiePolicy,
) -> impl IntoResponse {
    let cookie = cookies.refresh_cookie(&session.pair.refresh, session.pair.refresh_duration);
    (
        status,
        [(SET_COOKIE, cookie)],
        Json(SessionResponse {
            token: session.pair.access,
            user: session.user,
        }),
    )
}

async fn register(
    State(state): State<UsersState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|_| invalid_body())?;
    let input = validate_register(payload)?;

    let session = CredentialFlow::new(&state.tokens, state.db.users())
        .register(&input.name, &input.email, &input.password)
        .await
        .map_err(AuthError::credentials)?;

    Ok(session_response(StatusCode::CREATED, session, state.cookies))
}

async fn login(
    State(state): State<UsersState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|_| invalid_body())?;
    let input = validate_login(payload)?;

    let session = CredentialFlow::new(&state.tokens, state.db.users())
        .login(&input.email, &input.password)
        .await
        .map_err(AuthError::credentials)?;

    Ok(session_response(StatusCode::OK, session, state.cookies))
}

/// Clear the refresh cookie. Always succeeds, whether or not a session existed.
async fn logout(State(state): State<UsersState>) -> impl IntoResponse {
    info!("User logged out");
    (
        StatusCode::OK,
        [(SET_COOKIE, state.cookies.clear_refresh_cookie())],
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    )
}

/// Rotate the refresh token: a valid cookie yields a new access token and a new cookie.
async fn refresh(
    State(state): State<UsersState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let presented = get_cookie(&headers, REFRESH_COOKIE_NAME);

    let rotation = RefreshCoordinator::new(&state.tokens, state.db.users())
        .rotate(presented)
        .await
        .map_err(|kind| AuthError::refresh(kind, state.cookies))?;

    let cookie = state
        .cookies
        .refresh_cookie(&rotation.pair.refresh, rotation.pair.refresh_duration);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(RefreshResponse {
            success: true,
            message: "Tokens refreshed successfully",
            token: rotation.pair.access,
            user: rotation.user,
        }),
    ))
}

async fn profile(
    State(state): State<UsersState>,
    Auth(subject): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .find_by_id(subject.as_str())
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.sanitized()))
}

fn invalid_body() -> ApiError {
    ApiError::validation(vec!["Invalid request body".to_string()])
}
