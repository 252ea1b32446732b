//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON wire
//! format used by the dashboard tooling. Each type implements [`Default`]
//! with production default values, and `#[serde(default)]` allows partial
//! JSON: missing fields get their default during deserialization.

use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

/// Root settings type for the Vox coordinator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoxSettings {
    /// Listener network settings.
    pub server: ServerSettings,
    /// Agent liveness thresholds.
    pub liveness: LivenessSettings,
    /// Upstream processing service settings.
    pub upstream: UpstreamSettings,
}

impl Default for VoxSettings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            liveness: LivenessSettings::default(),
            upstream: UpstreamSettings::default(),
        }
    }
}

impl VoxSettings {
    /// Check cross-field invariants.
    ///
    /// The hard-staleness sweep runs at `stale_threshold_ms / 2` and assumes
    /// the soft-inactivity interval is strictly shorter, so a flipped or
    /// zero pair is a configuration error.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let l = &self.liveness;
        if l.heartbeat_interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "heartbeatIntervalMs must be nonzero".into(),
            ));
        }
        if l.stale_threshold_ms <= l.heartbeat_interval_ms {
            return Err(SettingsError::Invalid(format!(
                "staleThresholdMs ({}) must exceed heartbeatIntervalMs ({})",
                l.stale_threshold_ms, l.heartbeat_interval_ms
            )));
        }
        Ok(())
    }
}

/// Listener network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Address to bind the listener to.
    pub bind_addr: String,
    /// Port for the WebSocket listener.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Agent liveness thresholds.
///
/// The soft interval drives a warning-only check; the stale threshold is the
/// maximum silent interval tolerated before forced eviction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LivenessSettings {
    /// Soft-inactivity interval in milliseconds. Agents silent longer than
    /// this are logged at warning level, nothing more.
    pub heartbeat_interval_ms: u64,
    /// Hard staleness threshold in milliseconds. Agents silent longer than
    /// this are disconnected and evicted.
    pub stale_threshold_ms: u64,
}

impl Default for LivenessSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 5_000,
            stale_threshold_ms: 30_000,
        }
    }
}

/// Upstream processing service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamSettings {
    /// Base URL of the service that performs the actual work.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 120_000,
        }
    }
}
