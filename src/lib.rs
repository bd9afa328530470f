pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod issuer;
pub mod jwt;
pub mod password;
pub mod rate_limit;

use api::create_api_router;
use auth::CookiePolicy;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use db::Database;
use issuer::{ExpiryPolicy, TokenIssuer};
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use url::Url;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Secret for signing access tokens
    pub access_secret: Vec<u8>,
    /// Secret for signing refresh tokens (must differ from the access secret)
    pub refresh_secret: Vec<u8>,
    /// Token lifetimes
    pub expiry: ExpiryPolicy,
    /// The single browser origin allowed to make credentialed requests
    pub cors_origin: Url,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Per-IP limits for login and registration
    pub rate_limit: RateLimitConfig,
}

fn cors_layer(origin: &Url) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match HeaderValue::from_str(&origin.origin().ascii_serialization()) {
        Ok(value) => cors.allow_origin(value),
        Err(e) => {
            tracing::error!(origin = %origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            cors
        }
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let tokens = Arc::new(TokenIssuer::new(
        &config.access_secret,
        &config.refresh_secret,
        config.expiry,
    ));

    let api_router = create_api_router(
        config.db.clone(),
        tokens,
        CookiePolicy::new(config.secure_cookies),
        Arc::new(config.rate_limit.clone()),
    );

    Router::new()
        .route("/", get(|| async { "Welcome to the API" }))
        .merge(api_router)
        .layer(cors_layer(&config.cors_origin))
        .layer(TraceLayer::new_for_http())
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
