//! Plugin system error types

use crate::types::PluginState;
use thiserror::Error;

/// Boxed cause carried by errors that wrap plugin-provided failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Plugin system result type
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur while loading, enabling or driving plugins.
///
/// Every error is reported synchronously at the offending call. None of them
/// are retried, and a failed load never leaves a partially registered plugin
/// or partial command set behind.
#[derive(Error, Debug)]
pub enum PluginError {
    /// A plugin with the same name is already registered
    #[error("Plugin '{name}' is already loaded")]
    DuplicatePluginName { name: String },

    /// The plugin constructor returned an error or panicked
    #[error("Failed to construct plugin of type {plugin_type}: {source}")]
    PluginConstructionFailed {
        plugin_type: &'static str,
        #[source]
        source: BoxError,
    },

    /// No usable descriptor could be resolved for a plugin type
    #[error("Missing or invalid descriptor for {plugin_type}: {reason}")]
    MissingDescriptor {
        plugin_type: String,
        reason: String,
    },

    /// A command entry used a field key outside the recognized set
    #[error("Unrecognized key '{key}' in descriptor of command '{command}'")]
    UnrecognizedDescriptorKey { command: String, key: String },

    /// A recognized command field carried a value of the wrong shape
    #[error("Invalid value for '{key}' in descriptor of command '{command}': expected {expected}")]
    InvalidDescriptorValue {
        command: String,
        key: String,
        expected: &'static str,
    },

    /// The requested lifecycle transition is not legal from the current state
    #[error("Cannot {operation} plugin '{name}' while it is {state}")]
    InvalidPluginState {
        name: String,
        state: PluginState,
        operation: &'static str,
    },

    /// The handle was not produced by this registry
    #[error("Plugin '{name}' is not managed by this registry")]
    NotAnExtension { name: String },

    /// The plugin instance is already borrowed further up the call stack
    #[error("Plugin '{name}' is busy and cannot be re-entered")]
    PluginBusy { name: String },

    /// The plugin's load hook failed; the load was rolled back
    #[error("Load hook of plugin '{name}' failed: {source}")]
    LoadHookFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The plugin's enable hook failed
    #[error("Enable hook of plugin '{name}' failed: {source}")]
    EnableHookFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// No registered command answers to the label
    #[error("Unknown command '{label}'")]
    UnknownCommand { label: String },

    /// The owning plugin's command hook failed
    #[error("Command '{command}' failed: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: BoxError,
    },

    /// The operation is intentionally not implemented by the harness
    #[error("Operation '{operation}' is not supported by the mock plugin registry")]
    UnsupportedCapability { operation: &'static str },
}

impl PluginError {
    /// Create a new missing descriptor error
    pub fn missing_descriptor(plugin_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingDescriptor {
            plugin_type: plugin_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unsupported capability error
    pub fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedCapability { operation }
    }

    /// Whether this error was raised by an intentionally unimplemented operation
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedCapability { .. })
    }
}
