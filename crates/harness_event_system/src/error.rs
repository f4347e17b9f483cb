//! Event dispatch error types

use plugin_system::BoxError;
use thiserror::Error;

/// Result type for binding and dispatch operations
pub type EventResult<T> = Result<T, EventError>;

/// Errors raised while binding listeners or dispatching events
#[derive(Error, Debug)]
pub enum EventError {
    /// A handler returned an error; dispatch stopped at this handler
    #[error("Handler '{handler}' of {listener} (plugin '{plugin}') failed on {event}: {source}")]
    HandlerInvocationFailed {
        plugin: String,
        listener: &'static str,
        handler: &'static str,
        event: &'static str,
        #[source]
        source: BoxError,
    },

    /// The listener instance is borrowed elsewhere and cannot be invoked
    #[error("Listener {listener} of plugin '{plugin}' is already borrowed")]
    ListenerUnavailable {
        plugin: String,
        listener: &'static str,
    },

    /// The plugin instance cannot act as the requested listener type
    #[error("Plugin '{plugin}' is a {actual}, not a {expected}")]
    ListenerTypeMismatch {
        plugin: String,
        expected: &'static str,
        actual: &'static str,
    },
}
