//! Settings loading with deep merge and environment variable overrides.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::LivepipeSettings;

/// `~/.livepipe`, falling back to `/tmp/.livepipe` without `HOME`.
pub(crate) fn livepipe_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".livepipe")
}

/// Resolve the default settings file path (`~/.livepipe/settings.json`).
pub fn settings_path() -> PathBuf {
    livepipe_home().join("settings.json")
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields the defaults; a file with invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<LivepipeSettings> {
    let defaults = serde_json::to_value(LivepipeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: LivepipeSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `LIVEPIPE_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut LivepipeSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
///
/// Invalid values are ignored with a warning so a typo in one variable never
/// prevents startup.
pub fn apply_overrides<F>(settings: &mut LivepipeSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read("LIVEPIPE_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read("LIVEPIPE_PORT") {
        match parse_u64_range(&v, 0, u64::from(u16::MAX)) {
            #[allow(clippy::cast_possible_truncation)]
            Some(port) => settings.server.port = port as u16,
            None => warn_invalid("LIVEPIPE_PORT", &v),
        }
    }
    if let Some(v) = read("LIVEPIPE_REQUEST_TIMEOUT_MS") {
        match parse_u64_range(&v, 100, 600_000) {
            Some(ms) => settings.server.request_timeout_ms = ms,
            None => warn_invalid("LIVEPIPE_REQUEST_TIMEOUT_MS", &v),
        }
    }

    // ── Database ────────────────────────────────────────────────────
    if let Some(v) = read("LIVEPIPE_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = read("LIVEPIPE_DB_POOL_SIZE") {
        match parse_u64_range(&v, 1, 256) {
            #[allow(clippy::cast_possible_truncation)]
            Some(n) => settings.database.pool_size = n as u32,
            None => warn_invalid("LIVEPIPE_DB_POOL_SIZE", &v),
        }
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read("LIVEPIPE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("LIVEPIPE_LOG_JSON") {
        match parse_bool(&v) {
            Some(b) => settings.logging.json = b,
            None => warn_invalid("LIVEPIPE_LOG_JSON", &v),
        }
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn warn_invalid(key: &str, value: &str) {
    tracing::warn!(key, value, "invalid env var, ignoring");
}
