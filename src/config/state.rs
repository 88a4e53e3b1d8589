// Application state module
// Owns the item store and cached config values shared by all connections

use std::sync::atomic::{AtomicBool, Ordering};

use super::types::Config;
use crate::store::{ItemStore, StoreError};

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Box<dyn ItemStore>,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: &Config, store: Box<dyn ItemStore>) -> Self {
        Self {
            config: config.clone(),
            store,
            cached_access_log: AtomicBool::new(config.logging.access_log),
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }

    /// Release the store at shutdown
    pub fn dispose(&self) -> Result<(), StoreError> {
        self.store.dispose()
    }
}
