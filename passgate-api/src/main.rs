//! # Passgate API Server
//!
//! Registers accounts, exchanges credentials for bearer tokens and lets
//! authenticated users update their profile or password.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/passgate \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p passgate-api
//! ```

use anyhow::Context;
use passgate_api::{
    app::{build_router, AppState},
    config::Config,
};
use passgate_shared::{
    auth::{jwt::JwtIssuer, password::CredentialCodec},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
    service::AuthService,
    store::postgres::PgUserStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to one JSON object per line
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "passgate_api=debug,passgate_shared=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Passgate API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let tokens = Arc::new(
        JwtIssuer::new(
            &config.jwt.secret,
            chrono::Duration::hours(config.jwt.expiration_hours),
        )
        .context("Invalid JWT configuration")?,
    );
    tracing::info!(
        token_lifetime_hours = tokens.expires_in().num_hours(),
        "Token issuer ready"
    );
    let codec = CredentialCodec::new(config.password).context("Invalid password hash parameters")?;

    let pool = create_pool(config.database.clone())
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await.context("Failed to run migrations")?;

    let store = Arc::new(PgUserStore::new(pool.clone()));
    let auth = AuthService::new(store, tokens.clone(), codec);

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(auth, tokens, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
