//! # Teamflow API Server
//!
//! REST backend for role-based project and task management with activity
//! tracking and PDF reporting.
//!
//! ## Architecture
//!
//! The server is built with Axum and provides:
//! - JWT authentication with worker/manager/admin roles
//! - Task board with explicit status transitions
//! - Project registry with task aggregates
//! - Append-only activity ledger with stats and PDF reports
//! - Notifications
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p teamflow-api
//! ```

use std::sync::Arc;
use teamflow_api::{app, config::Config};
use teamflow_shared::{db, mail::LogMailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teamflow_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Teamflow API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // Create the database (dev convenience), connect, migrate
    db::migrations::ensure_database_exists(&config.database.url).await?;

    let pool = db::pool::create_pool(db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::migrations::run_migrations(&pool).await?;

    let state = app::AppState::new(pool, config.clone(), Arc::new(LogMailer));
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, router).await?;

    Ok(())
}
