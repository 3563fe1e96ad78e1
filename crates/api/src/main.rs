//! Glossa API server

use std::sync::Arc;

use anyhow::Context;
use glossa_api::{
    auth::JwtManager,
    directory::{PgOrganizationDirectory, PgUserDirectory},
    email::{EmailConfig, EmailSender, ResendTransport},
    routes::create_router,
    AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("glossa_api=info,tower_http=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;

    let pool = glossa_shared::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to database")?;
    glossa_shared::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let jwt = JwtManager::new(
        &config.jwt_secret,
        config.jwt_expiry_hours,
        config.super_token_expiry_minutes,
    );

    let email = EmailSender::new(
        EmailConfig::new(config.smtp_from.clone()),
        Arc::new(ResendTransport::new(
            config.resend_api_key.clone(),
            config.resend_base_url.clone(),
        )),
    );
    if !email.is_enabled() {
        tracing::warn!("SMTP_FROM not set, outgoing e-mail will be refused");
    }

    let state = AppState::new(
        Arc::new(PgUserDirectory::new(pool.clone())),
        Arc::new(PgOrganizationDirectory::new(pool)),
        jwt,
        email,
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    tracing::info!(address = %config.bind_address, "Glossa API listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
