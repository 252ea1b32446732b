//! Settings loading: file layer plus environment overrides.

use std::path::Path;

use tracing::warn;

use crate::errors::Result;
use crate::types::VoxSettings;

/// Load settings from an optional file path, apply `VOX_*` env overrides,
/// and validate.
///
/// With no path, the file layer is skipped entirely and only defaults plus
/// environment apply.
pub fn load_settings(path: Option<&Path>) -> Result<VoxSettings> {
    let mut settings = match path {
        Some(p) => load_file(p)?,
        None => VoxSettings::default(),
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a specific file path (no env layer, no validation).
///
/// A missing file is not an error: it yields compiled defaults, matching the
/// first-run experience.
pub fn load_settings_from_path(path: &Path) -> Result<VoxSettings> {
    load_file(path)
}

fn load_file(path: &Path) -> Result<VoxSettings> {
    if !path.exists() {
        warn!(?path, "settings file not found, using defaults");
        return Ok(VoxSettings::default());
    }
    let raw = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw)?;
    Ok(settings)
}

/// Apply `VOX_*` environment overrides through a lookup function.
///
/// The lookup indirection keeps this testable without mutating process-global
/// environment from parallel tests. Unparseable values are ignored with a
/// warning rather than failing startup.
pub fn apply_env_overrides<F>(settings: &mut VoxSettings, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = var("VOX_BIND_ADDR") {
        settings.server.bind_addr = v;
    }
    if let Some(v) = parsed(&var, "VOX_PORT") {
        settings.server.port = v;
    }
    if let Some(v) = parsed(&var, "VOX_HEARTBEAT_INTERVAL_MS") {
        settings.liveness.heartbeat_interval_ms = v;
    }
    if let Some(v) = parsed(&var, "VOX_STALE_THRESHOLD_MS") {
        settings.liveness.stale_threshold_ms = v;
    }
    if let Some(v) = var("VOX_UPSTREAM_URL") {
        settings.upstream.base_url = v;
    }
    if let Some(v) = parsed(&var, "VOX_UPSTREAM_TIMEOUT_MS") {
        settings.upstream.request_timeout_ms = v;
    }
}

fn parsed<F, T>(var: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = var(name)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(name, raw, "ignoring unparseable env override");
            None
        }
    }
}
