//! `tracing` subscriber setup for the livepipe binary.

use std::str::FromStr;

use livepipe_settings::LoggingSettings;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A global subscriber was already set.
    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Configuration for the telemetry subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by RUST_LOG env var at startup.
    pub log_level: Level,
    /// Per-module level overrides (e.g. "livepipe_hydrate" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// JSON lines on stdout instead of the human-readable format.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            module_levels: Vec::new(),
            json: true,
        }
    }
}

impl TelemetryConfig {
    /// Build from the logging settings section. Unparseable levels fall back
    /// to INFO (root) or are dropped (per-module).
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        let log_level = Level::from_str(&settings.level).unwrap_or(Level::INFO);
        let module_levels = settings
            .module_levels
            .iter()
            .filter_map(|(module, level)| {
                Level::from_str(level).ok().map(|l| (module.clone(), l))
            })
            .collect();
        Self {
            log_level,
            module_levels,
            json: settings.json,
        }
    }
}

/// Render an `EnvFilter` directive string, e.g. `info,livepipe_hydrate=debug`.
pub fn filter_directive(base: Level, module_levels: &[(String, Level)]) -> String {
    let mut filter = base.to_string().to_lowercase();
    for (module, level) in module_levels {
        filter.push_str(&format!(",{}={}", module, level.to_string().to_lowercase()));
    }
    filter
}

/// `rust_log` when it parses, otherwise the configured levels.
fn select_filter(config: &TelemetryConfig, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(filter_directive(config.log_level, &config.module_levels)))
}

/// Initialize the telemetry subsystem. Call once at startup.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = select_filter(config, rust_log.as_deref());

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_list(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn directive_without_overrides() {
        assert_eq!(filter_directive(Level::WARN, &[]), "warn");
    }

    #[test]
    fn directive_with_module_overrides() {
        let levels = vec![
            ("livepipe_hydrate".to_string(), Level::DEBUG),
            ("livepipe_store".to_string(), Level::TRACE),
        ];
        assert_eq!(
            filter_directive(Level::INFO, &levels),
            "info,livepipe_hydrate=debug,livepipe_store=trace"
        );
    }

    #[test]
    fn config_from_settings_parses_levels() {
        let mut module_levels = BTreeMap::new();
        module_levels.insert("livepipe_store".to_string(), "debug".to_string());
        module_levels.insert("noisy".to_string(), "loud".to_string());
        let settings = LoggingSettings {
            level: "warn".into(),
            json: false,
            module_levels,
        };

        let config = TelemetryConfig::from_settings(&settings);
        assert_eq!(config.log_level, Level::WARN);
        assert_eq!(
            config.module_levels,
            vec![("livepipe_store".to_string(), Level::DEBUG)]
        );
        assert!(!config.json);
    }

    #[test]
    fn rust_log_wins_over_settings() {
        let config = TelemetryConfig {
            module_levels: vec![("livepipe_hydrate".to_string(), Level::DEBUG)],
            ..TelemetryConfig::default()
        };
        let filter = select_filter(&config, Some("livepipe_store=trace")).to_string();
        assert!(filter.contains("livepipe_store=trace"), "{filter}");
        assert!(!filter.contains("livepipe_hydrate"), "{filter}");
    }

    #[test]
    fn settings_apply_without_rust_log() {
        let config = TelemetryConfig {
            module_levels: vec![("livepipe_hydrate".to_string(), Level::DEBUG)],
            ..TelemetryConfig::default()
        };
        for rust_log in [None, Some("")] {
            let filter = select_filter(&config, rust_log).to_string();
            assert!(filter.contains("livepipe_hydrate=debug"), "{filter}");
        }
    }

    #[test]
    fn config_from_settings_falls_back_to_info() {
        let settings = LoggingSettings {
            level: "chatty".into(),
            ..LoggingSettings::default()
        };
        assert_eq!(TelemetryConfig::from_settings(&settings).log_level, Level::INFO);
    }
}
