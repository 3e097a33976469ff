use crate::config::ApiConfig;
use crate::store::{memory::MemoryStore, seed_demo_data, DataBackend};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub store: Arc<dyn DataBackend>,
}

impl AppState {
    /// Build the application state with an in-memory backend, seeding the
    /// demo dataset when configured
    pub async fn new(config: ApiConfig) -> Self {
        let store = MemoryStore::new();
        let state = Self {
            config: Arc::new(config),
            store: Arc::new(store),
        };
        if state.config.seed {
            seed_demo_data(state.store.as_ref()).await;
        }
        state
    }

    #[cfg(test)]
    pub fn with_store(config: ApiConfig, store: Arc<dyn DataBackend>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
