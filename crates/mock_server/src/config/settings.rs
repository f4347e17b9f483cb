//! Configuration settings structures

use serde::{Deserialize, Serialize};

/// Root configuration of a mock server.
///
/// Serialized to and from TOML configuration files.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Identity the server reports to plugins and logs
    pub server: ServerSettings,
    /// Optional logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSettings>,
}

/// Server identity settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub name: String,
    pub version: String,
}

/// Logging system configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Logging level filter
    ///
    /// Valid values: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    pub level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                name: "MockServer".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: Some(LoggingSettings::default()),
        }
    }
}
