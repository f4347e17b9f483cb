//! # Mock Server
//!
//! An in-memory stand-in for a game server, used to exercise plugins from
//! tests without any networking, threads or files.
//!
//! A [`MockServer`] owns one [`PluginRegistry`] and one [`EventDispatcher`].
//! Servers share nothing with each other, so every test can build its own.
//!
//! ```rust
//! use mock_server::events::{Action, PlayerInteractEvent};
//! use mock_server::{
//!     BoxError, HandlerResult, HandlerSet, Listener, MockServer, Plugin, PluginDescriptor,
//!     PluginInit,
//! };
//!
//! #[derive(Default)]
//! struct Clicks {
//!     count: u32,
//! }
//!
//! impl Plugin for Clicks {
//!     fn create(_init: PluginInit) -> Result<Self, BoxError> {
//!         Ok(Self::default())
//!     }
//! }
//!
//! impl Clicks {
//!     fn on_interact(&mut self, _event: &PlayerInteractEvent) -> HandlerResult {
//!         self.count += 1;
//!         Ok(())
//!     }
//! }
//!
//! impl Listener for Clicks {
//!     fn handlers(set: &mut HandlerSet<Self>) {
//!         set.on("on_interact", Self::on_interact);
//!     }
//! }
//!
//! let mut server = MockServer::new();
//! let plugin = server.load_plugin_with::<Clicks>(PluginDescriptor::new("Clicks", "1.0"))?;
//! server.enable_plugin(&plugin)?;
//! server.register_plugin_events::<Clicks>(&plugin)?;
//!
//! server.call_event(&PlayerInteractEvent::new("Steve", Action::RightClickAir))?;
//! assert_eq!(plugin.borrow::<Clicks>().map(|p| p.count), Some(1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod events;
pub mod logging;

pub use config::{load_config, HarnessConfig, LoggingSettings, ServerSettings};
pub use harness_event_system::{
    impl_event, DispatchStats, Event, EventDispatcher, EventError, EventResult, HandlerInfo,
    HandlerResult, HandlerSet, Listener,
};
pub use logging::setup_logging;
pub use plugin_system::{
    BoxError, Command, CommandSender, Plugin, PluginDescriptor, PluginError, PluginHandle,
    PluginId, PluginInit, PluginRegistry, PluginResult, PluginState, RegistryId,
};

use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// In-memory server hosting plugins under test.
pub struct MockServer {
    config: HarnessConfig,
    registry: PluginRegistry,
    dispatcher: EventDispatcher,
}

impl MockServer {
    /// Create a server with the default configuration
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::default())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        info!(
            "Starting mock server {} v{}",
            config.server.name, config.server.version
        );
        Self {
            config,
            registry: PluginRegistry::new(),
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    // ========================================================================
    // Plugins
    // ========================================================================

    /// Load `P` from its bundled descriptor
    pub fn load_plugin<P: Plugin>(&mut self) -> PluginResult<PluginHandle> {
        self.registry.load::<P>()
    }

    /// Load `P` with an explicit descriptor
    pub fn load_plugin_with<P: Plugin>(
        &mut self,
        descriptor: PluginDescriptor,
    ) -> PluginResult<PluginHandle> {
        self.registry.load_with_descriptor::<P>(descriptor)
    }

    pub fn enable_plugin(&mut self, plugin: &PluginHandle) -> PluginResult<()> {
        self.registry.enable(plugin)
    }

    /// Always fails: disabling plugins is not supported
    pub fn disable_plugin(&mut self, plugin: &PluginHandle) -> PluginResult<()> {
        self.registry.disable(plugin)
    }

    /// Look up a plugin by its exact name
    pub fn plugin(&self, name: &str) -> Option<PluginHandle> {
        self.registry.get(name)
    }

    pub fn plugins(&self) -> &[PluginHandle] {
        self.registry.list()
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Every command published by loaded plugins, in publication order
    pub fn commands(&self) -> &[Command] {
        self.registry.commands().list()
    }

    /// Run a command as `sender`, returning what the owning plugin reported
    pub fn execute_command(
        &self,
        sender: &CommandSender,
        label: &str,
        args: &[&str],
    ) -> PluginResult<bool> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        self.registry.execute_command(sender, label, &args)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Bind `listener` as the plugin's listener, replacing any previous one
    pub fn register_events<L: Listener>(
        &mut self,
        plugin: &PluginHandle,
        listener: L,
    ) -> Rc<RefCell<L>> {
        self.dispatcher.bind(plugin, listener)
    }

    /// Bind the plugin instance itself as the plugin's listener
    pub fn register_plugin_events<L: Listener + Plugin>(
        &mut self,
        plugin: &PluginHandle,
    ) -> EventResult<()> {
        self.dispatcher.bind_plugin::<L>(plugin)
    }

    /// Dispatch `event` and return how many handlers ran
    pub fn call_event(&mut self, event: &dyn Event) -> EventResult<usize> {
        self.dispatcher.dispatch(event)
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}
