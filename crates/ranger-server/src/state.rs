//! Application state shared across handlers and the sweep task.

use std::sync::Arc;

use ranger_core::{Config, ObservationRegistry, ScanSession};
use tokio::sync::RwLock;

/// State behind the shared lock.
///
/// The registry synchronizes itself, so ingestion and snapshots only need a
/// read guard. Session and config changes take the write guard.
#[derive(Debug)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Config,
    /// Latest sighting per device.
    pub registry: Arc<ObservationRegistry>,
    /// Scan lifecycle.
    pub session: ScanSession,
}

/// Shared, lockable application state.
pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    /// Build state from configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(ObservationRegistry::from_config(&config.estimation));
        let session = ScanSession::from_config(&config.scan);
        Self {
            config,
            registry,
            session,
        }
    }

    /// Build state and wrap it for sharing.
    #[must_use]
    pub fn shared(config: Config) -> SharedState {
        Arc::new(RwLock::new(Self::new(config)))
    }
}
