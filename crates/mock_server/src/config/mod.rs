//! Configuration for the mock server
//!
//! Handles configuration file parsing and provides default settings.

pub mod settings;

pub use settings::{HarnessConfig, LoggingSettings, ServerSettings};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Load configuration from file or create a default configuration
///
/// If the file doesn't exist, a default configuration file is written at
/// `path` and the default settings are returned.
///
/// # Errors
/// * Returns error if file I/O operations fail
/// * Returns error if TOML parsing fails
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    if path.exists() {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        match toml::from_str::<HarnessConfig>(&config_str) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("Failed to parse config file {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    } else {
        warn!("Configuration file not found: {}, using defaults", path.display());

        let default_config = HarnessConfig::default();
        let config_str = toml::to_string_pretty(&default_config)?;
        fs::write(path, config_str)
            .with_context(|| format!("writing default config file {}", path.display()))?;
        info!("Created default configuration file: {}", path.display());

        Ok(default_config)
    }
}
