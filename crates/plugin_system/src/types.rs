//! Identifier and lifecycle types shared by the registries

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a loaded plugin.
///
/// Commands and listener bindings refer to their owner through this id. It is
/// a lookup key only; holding one never keeps a plugin alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginId(pub Uuid);

impl PluginId {
    /// Creates a new random plugin ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PluginId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the registry that constructed a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryId(pub Uuid);

impl RegistryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plugin state in the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginState {
    /// Constructed but the load hook has not completed
    Unloaded,
    /// Loaded and waiting to be enabled
    Loaded,
    /// Enabled and active
    Enabled,
    /// Disabled after having been enabled
    Disabled,
}

impl PluginState {
    /// Check if the plugin is active (enabled)
    pub fn is_active(self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Get the next valid states from the current state
    pub fn valid_transitions(self) -> &'static [PluginState] {
        match self {
            Self::Unloaded => &[Self::Loaded],
            Self::Loaded => &[Self::Enabled],
            Self::Enabled => &[Self::Disabled],
            Self::Disabled => &[],
        }
    }

    /// Check if transition to another state is valid
    pub fn can_transition_to(self, target: PluginState) -> bool {
        self.valid_transitions().contains(&target)
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => write!(f, "Unloaded"),
            Self::Loaded => write!(f, "Loaded"),
            Self::Enabled => write!(f, "Enabled"),
            Self::Disabled => write!(f, "Disabled"),
        }
    }
}
