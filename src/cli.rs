//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::issuer::{ACCESS_TOKEN_DURATION_SECS, ExpiryPolicy, REFRESH_TOKEN_DURATION_SECS};
use crate::rate_limit::{DEFAULT_LOGIN_PER_MINUTE, DEFAULT_REGISTER_PER_MINUTE, RateLimitConfig};
use clap::Parser;
use tracing::{error, info};
use url::Url;

const MIN_SECRET_LENGTH: usize = 32;

/// Environment variable holding the access token secret.
pub const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";

/// Environment variable holding the refresh token secret.
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tokenwarden",
    about = "Access/refresh token authentication service"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file (":memory:" for a throwaway database)
    #[arg(short, long, env = "DATABASE_URL")]
    pub database: String,

    /// Browser origin allowed to call the API with credentials (e.g. "https://app.example.com")
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: String,

    /// Path to file containing the access token secret. Prefer ACCESS_TOKEN_SECRET instead
    #[arg(long)]
    pub access_token_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer REFRESH_TOKEN_SECRET instead
    #[arg(long)]
    pub refresh_token_secret_file: Option<String>,

    /// Access token lifetime in seconds (at most the refresh token lifetime)
    #[arg(long, default_value_t = ACCESS_TOKEN_DURATION_SECS,
        value_parser = clap::value_parser!(u64).range(1..=REFRESH_TOKEN_DURATION_SECS))]
    pub access_token_ttl: u64,

    /// Login attempts allowed per minute per client IP
    #[arg(long, default_value_t = DEFAULT_LOGIN_PER_MINUTE)]
    pub login_rate_per_minute: u32,

    /// Registrations allowed per minute per client IP
    #[arg(long, default_value_t = DEFAULT_REGISTER_PER_MINUTE)]
    pub register_rate_per_minute: u32,

    /// Take the client IP from X-Forwarded-For (only behind a trusted reverse proxy)
    #[arg(long)]
    pub trust_forwarded_for: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Read a secret from a file, trimming surrounding whitespace.
pub fn read_secret_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to read secret file");
            None
        }
    }
}

/// Load a secret from environment variable `env_name` or from `file`.
/// Returns None and logs an error if the secret cannot be loaded or is too short.
pub fn load_secret(env_name: &str, file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var(env_name) {
        // Clear the environment variable to prevent leaking
        // SAFETY: main calls this before the Tokio runtime is built, so no
        // other thread exists yet to read the environment concurrently.
        unsafe { std::env::remove_var(env_name) };
        secret
    } else if let Some(path) = file {
        read_secret_file(path)?
    } else {
        error!(
            variable = %env_name,
            "Secret is required. Set the environment variable (recommended) or pass the secret file option"
        );
        return None;
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            variable = %env_name,
            "Secret is shorter than {} characters. Use a longer secret", MIN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Check that the two token classes use independent secrets.
pub fn check_secret_pair(access: &str, refresh: &str) -> bool {
    if access == refresh {
        error!("Access and refresh token secrets must be different");
        return false;
    }
    true
}

/// Load both signing secrets. Returns None and logs an error if either is unusable.
/// Must run before any other thread is spawned, since it edits the environment.
pub fn load_secrets(args: &Args) -> Option<(String, String)> {
    let access = load_secret(ACCESS_SECRET_ENV, args.access_token_secret_file.as_deref())?;
    let refresh = load_secret(REFRESH_SECRET_ENV, args.refresh_token_secret_file.as_deref())?;
    check_secret_pair(&access, &refresh).then_some((access, refresh))
}

/// Parse and validate the CORS origin URL.
/// Returns None and logs an error if validation fails.
pub fn validate_cors_origin(cors_origin: &str) -> Option<Url> {
    let url = match Url::parse(cors_origin) {
        Ok(url) => url,
        Err(e) => {
            error!(origin = %cors_origin, error = %e, "Invalid CORS origin URL");
            return None;
        }
    };

    let is_https = url.scheme() == "https";
    let is_localhost = url.scheme() == "http"
        && matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));

    if !is_https && !is_localhost {
        error!(origin = %cors_origin, "CORS origin must use HTTPS for non-localhost deployments");
        return None;
    }

    Some(url)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    args: &Args,
    db: Database,
    cors_origin: Url,
    access_secret: String,
    refresh_secret: String,
) -> ServerConfig {
    let secure_cookies = cors_origin.scheme() == "https";

    ServerConfig {
        db,
        access_secret: access_secret.into_bytes(),
        refresh_secret: refresh_secret.into_bytes(),
        expiry: ExpiryPolicy {
            access_secs: args.access_token_ttl,
            refresh_secs: REFRESH_TOKEN_DURATION_SECS,
        },
        cors_origin,
        secure_cookies,
        rate_limit: RateLimitConfig::new(
            args.login_rate_per_minute,
            args.register_rate_per_minute,
            args.trust_forwarded_for,
        ),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
