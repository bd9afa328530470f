mod error;
mod users;
mod validate;

use axum::Router;
use std::sync::Arc;

use crate::auth::CookiePolicy;
use crate::db::Database;
use crate::issuer::TokenIssuer;
use crate::rate_limit::RateLimitConfig;

pub use error::ApiError;
pub use users::UsersState;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    tokens: Arc<TokenIssuer>,
    cookies: CookiePolicy,
    rate_limit_config: Arc<RateLimitConfig>,
) -> Router {
    let users_state = users::UsersState {
        db,
        tokens,
        cookies,
        rate_limit_config,
    };

    Router::new().merge(users::router(users_state))
}
