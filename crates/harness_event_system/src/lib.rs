//! # Harness Event System
//!
//! Synchronous, typed event delivery from a test harness to plugin listeners.
//!
//! ## Core Features
//!
//! - **Declared Handlers**: listener types list their handler methods through
//!   [`Listener::handlers`]; nothing is discovered by inspecting signatures
//! - **Event Hierarchies**: events embed their parent event, and a handler for
//!   a parent type also receives every descendant
//! - **Discovery Caching**: handler tables are built once per listener type
//!   and shared by every binding of that type
//! - **One Listener per Plugin**: binding again for a plugin replaces its
//!   previous listener
//!
//! ## Quick Start Example
//!
//! ```rust
//! use harness_event_system::{impl_event, EventDispatcher, HandlerResult, HandlerSet, Listener};
//! use plugin_system::{BoxError, Plugin, PluginDescriptor, PluginInit, PluginRegistry};
//!
//! #[derive(Debug)]
//! struct PlayerJoinEvent {
//!     player: String,
//! }
//!
//! impl_event!(PlayerJoinEvent);
//!
//! struct Welcome;
//!
//! impl Plugin for Welcome {
//!     fn create(_init: PluginInit) -> Result<Self, BoxError> {
//!         Ok(Welcome)
//!     }
//! }
//!
//! #[derive(Default)]
//! struct JoinLog {
//!     joined: Vec<String>,
//! }
//!
//! impl JoinLog {
//!     fn on_join(&mut self, event: &PlayerJoinEvent) -> HandlerResult {
//!         self.joined.push(event.player.clone());
//!         Ok(())
//!     }
//! }
//!
//! impl Listener for JoinLog {
//!     fn handlers(set: &mut HandlerSet<Self>) {
//!         set.on("on_join", Self::on_join);
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! let plugin = registry.load_with_descriptor::<Welcome>(PluginDescriptor::new("Welcome", "1.0"))?;
//!
//! let mut dispatcher = EventDispatcher::new();
//! let log = dispatcher.bind(&plugin, JoinLog::default());
//! dispatcher.dispatch(&PlayerJoinEvent { player: "Steve".into() })?;
//!
//! assert_eq!(log.borrow().joined, vec!["Steve"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod listener;

pub use dispatcher::{DispatchStats, EventDispatcher};
pub use error::{EventError, EventResult};
pub use event::Event;
pub use listener::{HandlerInfo, HandlerResult, HandlerSet, HandlerTable, Listener};

/// Version of the event system crate
pub const EVENT_SYSTEM_VERSION: &str = env!("CARGO_PKG_VERSION");
