pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod tracker;

use std::sync::Arc;
use actix_web::HttpResponse;
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use db::{MemoryStore, PgStore, PlayerStore};
pub use tracker::{GameEvent, Player, RoundTracker, StatsPlugin};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<dyn PlayerStore>,
}

impl AppState {
    /// Connects the configured store, running migrations for Postgres.
    pub async fn new(config: Settings) -> Result<Self> {
        let store: Arc<dyn PlayerStore> = if config.database.is_memory() {
            info!("Using in-memory player store");
            Arc::new(MemoryStore::new())
        } else {
            let store = PgStore::connect(&config.database).await?;
            store.migrate().await?;
            info!("Database ready: {:?}", store.get_pool_status());
            Arc::new(store)
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Settings, store: Arc<dyn PlayerStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
