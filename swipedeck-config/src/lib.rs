//! Configuration loading for the swipedeck engine.
//!
//! [`load`] resolves a [`SwipeDeckConfig`] from an explicit file, the
//! environment, or a config file in the working directory, then runs the
//! guard rails and logs any warnings.

pub mod loader;
pub mod validation;

use std::path::Path;

use anyhow::Context;
use swipedeck_core::SwipeDeckConfig;
use tracing::{info, warn};

pub use loader::{
    CONFIG_JSON_ENV, CONFIG_PATH_ENV, ConfigSource, load_from_env,
    load_from_file, load_with, parse_from_str, parse_json, to_toml_string,
};
pub use validation::{
    ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};

/// A validated configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The configuration that passed the guard rails.
    pub config: SwipeDeckConfig,
    /// Where it was read from.
    pub source: ConfigSource,
    /// Accepted but questionable settings.
    pub warnings: ConfigWarnings,
}

/// Load from `explicit` when given, otherwise through [`load_from_env`],
/// and reject configurations that fail the guard rails.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    let (config, source) = match explicit {
        Some(path) => {
            (load_from_file(path)?, ConfigSource::File(path.to_path_buf()))
        }
        None => load_from_env()?,
    };
    validate(config, source)
}

/// Run the guard rails over an already-parsed config and log its warnings.
pub fn validate(
    config: SwipeDeckConfig,
    source: ConfigSource,
) -> anyhow::Result<LoadedConfig> {
    let warnings = apply_guard_rails(&config)
        .with_context(|| format!("rejected deck config from {source}"))?;

    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(%source, hint = %hint, "{}", warning.message),
            None => warn!(%source, "{}", warning.message),
        }
    }
    info!(%source, warnings = warnings.len(), "deck config loaded");

    Ok(LoadedConfig {
        config,
        source,
        warnings,
    })
}
