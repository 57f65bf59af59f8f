//! # livepipe-settings
//!
//! Configuration with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** - [`LivepipeSettings::default()`]
//! 2. **Settings file** - `~/.livepipe/settings.json` or an explicit path
//!    (deep-merged over defaults)
//! 3. **Environment variables** - `LIVEPIPE_*` overrides (highest priority)
//!
//! There is no process-wide settings singleton: the binary loads settings
//! once and hands the relevant sections to each subsystem.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings_from_path, settings_path,
};
pub use types::{DatabaseSettings, LivepipeSettings, LoggingSettings, ServerSettings};
