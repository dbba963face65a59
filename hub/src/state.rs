use std::sync::Arc;

use crate::config::HubConfig;
use crate::db::{ActivityStore, DistanceStore, EngineHoursStore, MessageStore, SqliteStore};

/// Shared application state, passed to all route handlers via `axum::extract::State`.
///
/// Holds nothing mutable: one repository per series, all read-only.
pub struct AppState {
    pub config: HubConfig,
    pub distance: Arc<dyn DistanceStore>,
    pub engine_hours: Arc<dyn EngineHoursStore>,
    pub activity: Arc<dyn ActivityStore>,
    pub messages: Arc<dyn MessageStore>,
}

impl AppState {
    pub fn new(config: HubConfig) -> Arc<Self> {
        let store = Arc::new(SqliteStore::open(&config.db_path, config.db_pool_size));
        if !store.is_available() {
            tracing::warn!("No database pool; data endpoints will answer with store errors");
        }
        Self::with_store(config, store)
    }

    /// Serve every series from the same SQLite store.
    pub fn with_store(config: HubConfig, store: Arc<SqliteStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            distance: store.clone(),
            engine_hours: store.clone(),
            activity: store.clone(),
            messages: store,
        })
    }
}
