//! Auth Key Service - Main Application Entry Point
//!
//! Issues, stores and resolves opaque auth keys bound to a user account.
//! A key authorizes a later action (such as a download) without a full
//! session.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Keys**: 256-bit OS randomness, stored as SHA-256 hashes
//! - **Sessions**: resolved from headers forwarded by the upstream gateway
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build the credential store and HTTP router
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod repository;
mod routes;
mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    repository::postgres::PgAuthKeyRepository,
    routes::AppState,
    services::{credential_store::CredentialStore, key_generator::OsKeyGenerator},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(
        port = config.server_port,
        max_page_size = config.max_page_size,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let store = CredentialStore::new(
        Arc::new(PgAuthKeyRepository::new(pool.clone())),
        Arc::new(OsKeyGenerator),
        config.page_limits(),
    );
    let app = routes::router(AppState { pool, store });

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
