//! Scan session lifecycle.
//!
//! Tracks whether a scan is running, when it started, and whether the radio
//! adapter was reported as enabled. A session can auto-stop after a fixed
//! period; the owner drives that by calling [`ScanSession::expire`] from its
//! own timer.
//!
//! Stopping a session never touches registry contents. Observations already
//! ingested stay until they are removed or age out.

use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ScanConfig;

/// Scan lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// No session has run yet.
    Idle,
    /// A session is running.
    Scanning,
    /// The last session was stopped.
    Stopped,
}

impl ScanState {
    /// Short status line for display.
    #[must_use]
    pub const fn status_text(self) -> &'static str {
        match self {
            Self::Idle => "Not scanning",
            Self::Scanning => "Scanning...",
            Self::Stopped => "Scan stopped",
        }
    }
}

/// Serializable view of a [`ScanSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "state": "scanning",
    "status": "Scanning...",
    "session_id": "0b5e8c5e-3f0a-4b7e-9a55-8a2d3c1f6e11",
    "started_at_ms": 1736911800000_i64,
    "stopped_at_ms": null,
    "period_ms": 10000,
    "adapter_enabled": true
}))]
pub struct ScanStatus {
    /// Lifecycle state.
    pub state: ScanState,

    /// Human-readable status line.
    #[schema(example = "Scanning...")]
    pub status: String,

    /// Identifier of the current or last session.
    pub session_id: Option<Uuid>,

    /// When the current or last session started (Unix ms).
    pub started_at_ms: Option<i64>,

    /// When the last session stopped (Unix ms).
    pub stopped_at_ms: Option<i64>,

    /// Auto-stop period in milliseconds, `0` when disabled.
    #[schema(example = 10000)]
    pub period_ms: u64,

    /// Whether the radio adapter was last reported enabled.
    pub adapter_enabled: bool,
}

/// State of the scan lifecycle for one owner.
#[derive(Debug, Clone)]
pub struct ScanSession {
    state: ScanState,
    session_id: Option<Uuid>,
    started_at_ms: Option<i64>,
    stopped_at_ms: Option<i64>,
    period_ms: u64,
    adapter_enabled: bool,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ScanSession {
    /// Create an idle session with the given auto-stop period (`0` disables it).
    #[must_use]
    pub const fn new(period_ms: u64) -> Self {
        Self {
            state: ScanState::Idle,
            session_id: None,
            started_at_ms: None,
            stopped_at_ms: None,
            period_ms,
            adapter_enabled: false,
        }
    }

    /// Create an idle session from scan settings.
    #[must_use]
    pub const fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.period_ms)
    }

    /// Start a new session.
    ///
    /// Returns `false` without changing anything if a session is already running.
    pub fn start(&mut self, now_ms: i64) -> bool {
        if self.is_scanning() {
            return false;
        }

        let id = Uuid::new_v4();
        self.state = ScanState::Scanning;
        self.session_id = Some(id);
        self.started_at_ms = Some(now_ms);
        self.stopped_at_ms = None;

        info!(session_id = %id, period_ms = self.period_ms, "Started scan session");
        true
    }

    /// Stop the running session.
    ///
    /// Returns `false` if no session was running.
    pub fn stop(&mut self, now_ms: i64) -> bool {
        if !self.is_scanning() {
            return false;
        }

        self.state = ScanState::Stopped;
        self.stopped_at_ms = Some(now_ms);

        if let Some(id) = self.session_id {
            info!(session_id = %id, "Stopped scan session");
        }
        true
    }

    /// Stop the session if its period has elapsed at `now_ms`.
    ///
    /// Returns `true` if the session was stopped by this call.
    pub fn expire(&mut self, now_ms: i64) -> bool {
        if self.period_ms == 0 || !self.is_scanning() {
            return false;
        }

        let Some(started) = self.started_at_ms else {
            return false;
        };
        let period = i64::try_from(self.period_ms).unwrap_or(i64::MAX);
        if now_ms.saturating_sub(started) < period {
            return false;
        }

        info!(period_ms = self.period_ms, "Scan period elapsed");
        self.stop(now_ms)
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Identifier of the current or last session.
    #[must_use]
    pub const fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Whether the radio adapter was last reported enabled.
    #[must_use]
    pub const fn adapter_enabled(&self) -> bool {
        self.adapter_enabled
    }

    /// Record the adapter's power state as reported by the platform.
    pub fn set_adapter_enabled(&mut self, enabled: bool) {
        if self.adapter_enabled != enabled {
            info!(enabled, "Adapter state changed");
        }
        self.adapter_enabled = enabled;
    }

    /// Serializable status view.
    #[must_use]
    pub fn status(&self) -> ScanStatus {
        ScanStatus {
            state: self.state,
            status: self.state.status_text().to_string(),
            session_id: self.session_id,
            started_at_ms: self.started_at_ms,
            stopped_at_ms: self.stopped_at_ms,
            period_ms: self.period_ms,
            adapter_enabled: self.adapter_enabled,
        }
    }
}
