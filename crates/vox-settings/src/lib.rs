//! # vox-settings
//!
//! Configuration management with layered sources for the Vox coordinator.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`VoxSettings::default()`]
//! 2. **Settings file**: JSON, partial files allowed (missing fields keep
//!    their defaults)
//! 3. **Environment variables**: `VOX_*` overrides (highest priority)
//!
//! Loading always ends with [`VoxSettings::validate`]: the liveness
//! thresholds are load-bearing (the hard sweep runs at half the stale
//! threshold), so an inconsistent pair is rejected instead of clamped.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path};
pub use types::{LivenessSettings, ServerSettings, UpstreamSettings, VoxSettings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let settings = VoxSettings::default();
        assert!(settings.validate().is_ok());
    }
}
