use std::net::SocketAddr;

use clap::Parser;
use tokenwarden::cli::{
    Args, build_config, init_logging, load_secrets, open_database, validate_cors_origin,
};
use tokenwarden::create_app;
use tracing::{error, info};

fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    // Secrets are read (and removed from the environment) while still single-threaded
    let Some((access_secret, refresh_secret)) = load_secrets(&args) else {
        std::process::exit(1);
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            error!(error = %e, "Failed to start runtime");
            std::process::exit(1);
        });

    runtime.block_on(serve(args, access_secret, refresh_secret));
}

async fn serve(args: Args, access_secret: String, refresh_secret: String) {
    let Some(cors_origin) = validate_cors_origin(&args.cors_origin) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap_or_else(|e| {
        error!(error = %e, "Failed to read local address");
        std::process::exit(1);
    });

    let config = build_config(&args, db, cors_origin, access_secret, refresh_secret);
    let app = create_app(&config);

    info!(
        address = %local_addr,
        access_token_ttl = config.expiry.access_secs,
        secure_cookies = config.secure_cookies,
        "Listening"
    );

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, make_service).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
