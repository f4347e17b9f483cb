//! Logging system setup
//!
//! Installs the tracing subscriber that renders the events emitted by the
//! plugin registry, the event dispatcher and the mock server itself.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Initialize the logging system
///
/// `RUST_LOG` overrides the configured level when set. Only one subscriber
/// can be installed per process; later calls return an error.
///
/// # Examples
/// ```
/// use mock_server::{setup_logging, LoggingSettings};
///
/// setup_logging(&LoggingSettings::default()).ok();
/// ```
pub fn setup_logging(settings: &LoggingSettings) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if settings.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}
