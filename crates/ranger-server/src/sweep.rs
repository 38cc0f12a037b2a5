//! Periodic registry sweep.
//!
//! The registry holds no timer of its own. This task ticks on the configured
//! interval, evicts entries older than `registry.max_age_ms`, and stops a scan
//! session whose period has elapsed.

use std::time::Duration;

use ranger_core::now_millis;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::SharedState;

/// What one sweep pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Entries evicted from the registry.
    pub evicted: usize,
    /// Whether the scan session was auto-stopped.
    pub session_expired: bool,
}

/// Run a single sweep at `now_ms`.
pub async fn sweep_once(state: &SharedState, now_ms: i64) -> SweepOutcome {
    let mut guard = state.write().await;
    let evicted = guard
        .registry
        .evict_stale(now_ms, guard.config.registry.max_age_ms);
    let session_expired = guard.session.expire(now_ms);

    SweepOutcome {
        evicted,
        session_expired,
    }
}

/// Spawn the sweep loop. It exits once `shutdown` flips to `true` or its
/// sender is dropped.
pub fn spawn(
    state: SharedState,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = period.as_millis(), "Registry sweep started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = sweep_once(&state, now_millis()).await;
                    debug!(
                        evicted = outcome.evicted,
                        session_expired = outcome.session_expired,
                        "Sweep pass complete"
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Registry sweep stopped");
    })
}
