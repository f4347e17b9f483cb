//! # Plugin System
//!
//! In-process plugin lifecycle management for the plugin test harness.
//!
//! ## Core Features
//!
//! - **Typed Loading**: plugins are Rust types implementing [`Plugin`], loaded
//!   with [`PluginRegistry::load`] from their bundled descriptor or with an
//!   explicit [`PluginDescriptor`]
//! - **Descriptor Parsing**: command tables are validated and published to a
//!   [`CommandRegistry`] as part of each load
//! - **Atomic Loads**: a load either fully succeeds or leaves the registry
//!   untouched, including when the plugin panics during construction
//! - **Lifecycle States**: `Unloaded -> Loaded -> Enabled` with explicit errors
//!   for illegal transitions and unsupported operations
//!
//! ## Quick Start Example
//!
//! ```rust
//! use plugin_system::{BoxError, Plugin, PluginInit, PluginRegistry, PluginState};
//!
//! struct Greeter;
//!
//! impl Plugin for Greeter {
//!     fn create(_init: PluginInit) -> Result<Self, BoxError> {
//!         Ok(Greeter)
//!     }
//!
//!     fn bundled_descriptor() -> Option<&'static str> {
//!         Some(r#"
//! name = "Greeter"
//! version = "1.0.0"
//!
//! [commands.greet]
//! aliases = ["hi", "hello"]
//! "#)
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! let greeter = registry.load::<Greeter>()?;
//! registry.enable(&greeter)?;
//!
//! assert_eq!(greeter.state(), PluginState::Enabled);
//! assert!(registry.commands().find("hi").is_some());
//! # Ok::<(), plugin_system::PluginError>(())
//! ```
//!
//! Everything here is single-threaded. Handles are reference counted with
//! `Rc` and are neither `Send` nor `Sync`.

pub mod command;
pub mod descriptor;
pub mod error;
pub mod plugin;
pub mod registry;
pub mod types;

pub use command::{Command, CommandRegistry, CommandSender};
pub use descriptor::{
    parse_commands, DescriptorError, PluginDescriptor, DESCRIPTOR_FILE_NAME,
    RECOGNIZED_COMMAND_KEYS,
};
pub use error::{BoxError, PluginError, PluginResult};
pub use plugin::{AsAny, LoaderHandle, Plugin, PluginHandle, PluginInit};
pub use registry::PluginRegistry;
pub use types::{PluginId, PluginState, RegistryId};

/// Version of the plugin system crate
pub const PLUGIN_SYSTEM_VERSION: &str = env!("CARGO_PKG_VERSION");
