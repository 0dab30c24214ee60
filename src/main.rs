//! Suprident server binary.
//!
//! Resolves configuration from the environment, opens the database and
//! evidence store, and serves the REST API.

use std::sync::{Arc, Mutex};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use suprident_core::config::{
    database_path_from_env_value, session_ttl_from_env_value, storage_dir_from_env_value,
};
use suprident_core::{CoreConfig, Database};
use suprident_files::PhotoStore;

/// Main entry point for the suprident application.
///
/// # Environment Variables
/// - `SUPRIDENT_ADDR`: server address (default: "0.0.0.0:3000")
/// - `SUPRIDENT_DATABASE`: SQLite database file (default: "suprident.db")
/// - `SUPRIDENT_STORAGE_DIR`: evidence storage root (default: "storage")
/// - `SUPRIDENT_SESSION_TTL_HOURS`: session lifetime (default: 12)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the database or storage root cannot be opened, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("suprident=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("SUPRIDENT_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let database_path = database_path_from_env_value(std::env::var("SUPRIDENT_DATABASE").ok());
    let storage_dir = storage_dir_from_env_value(std::env::var("SUPRIDENT_STORAGE_DIR").ok());
    let session_ttl =
        session_ttl_from_env_value(std::env::var("SUPRIDENT_SESSION_TTL_HOURS").ok())?;

    if !storage_dir.exists() {
        std::fs::create_dir_all(&storage_dir)?;
    }

    let cfg = Arc::new(CoreConfig::new(
        database_path,
        storage_dir.clone(),
        session_ttl,
    )?);

    let db = Database::open(cfg.database_path())?;
    let photos = PhotoStore::new(&storage_dir)?;

    tracing::info!("++ Starting suprident REST on {}", addr);

    let state = AppState {
        cfg,
        db: Arc::new(Mutex::new(db)),
        photos: Arc::new(photos),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
