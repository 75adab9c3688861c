use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::PluginConfig;
use crate::error::UploadError;
use crate::tracker::client::{BackendClient, UploadReport};
use crate::tracker::events::GameEvent;
use crate::tracker::experience::ExperienceCache;
use crate::tracker::round::RoundTracker;

/// Glue between the host server's callbacks and the backend.
///
/// Event callbacks run on the game thread and only touch in-memory state;
/// network work is spawned onto the given tokio runtime.
pub struct StatsPlugin {
    tracker: Mutex<RoundTracker>,
    client: BackendClient,
    experience: ExperienceCache,
    refresh_interval: Duration,
    runtime: Handle,
}

impl StatsPlugin {
    pub fn new(config: &PluginConfig, runtime: Handle) -> Result<Arc<Self>, UploadError> {
        let client = BackendClient::new(config)?;
        info!("Stats plugin reporting to {}", config.endpoint_url);

        Ok(Arc::new(Self {
            tracker: Mutex::new(RoundTracker::new()),
            client,
            experience: ExperienceCache::new(),
            refresh_interval: config.experience_refresh_interval(),
            runtime,
        }))
    }

    pub fn on_event(&self, event: GameEvent) -> Option<JoinHandle<UploadReport>> {
        self.on_event_at(event, Utc::now())
    }

    /// Feeds one event to the tracker. When it ends a round the upload is
    /// spawned and its handle returned; the round data is gone from memory
    /// either way.
    pub fn on_event_at(&self, event: GameEvent, at: DateTime<Utc>) -> Option<JoinHandle<UploadReport>> {
        let snapshot = self
            .tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle(event, at)?;

        let client = self.client.clone();
        Some(self.runtime.spawn(async move { client.upload_round(snapshot).await }))
    }

    pub fn experience(&self, user_id: &str) -> i64 {
        self.experience.get(user_id)
    }

    pub fn connected_players(&self) -> Vec<String> {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .connected_players()
    }

    /// Fetches experience for everyone currently connected. Failures keep
    /// the previous values.
    pub async fn refresh_experience(&self) {
        let players = self.connected_players();
        if players.is_empty() {
            debug!("No connected players, skipping experience refresh");
            return;
        }

        match self.client.fetch_experience(&players).await {
            Ok(fetched) => {
                debug!("Fetched experience for {} player(s)", fetched.len());
                self.experience.replace(fetched);
            }
            Err(e) => error!("Failed to fetch experience: {}", e),
        }
    }

    /// Spawns the loop that keeps the experience cache current.
    pub fn start_experience_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let plugin = Arc::clone(self);
        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(plugin.refresh_interval);
            loop {
                ticker.tick().await;
                plugin.refresh_experience().await;
            }
        })
    }
}
