//! Event dispatcher binding plugins to their listeners.
//!
//! Each plugin has at most one bound listener. Binding again for the same
//! plugin replaces the previous listener, and the replacement moves to the end
//! of the binding order. Dispatch walks bindings in that order and each
//! binding's handlers in declaration order, synchronously, on the caller's
//! thread.

use crate::error::{EventError, EventResult};
use crate::event::Event;
use crate::listener::{HandlerInfo, HandlerTable, Listener};
use plugin_system::{Plugin, PluginHandle, PluginId};
use std::any::{type_name, Any, TypeId};
use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, error, warn};

/// Where a bound listener instance lives
enum ListenerSlot {
    /// A listener value owned by the dispatcher and shared with the caller,
    /// with its concrete type name
    Shared(Rc<RefCell<dyn Any>>, &'static str),
    /// The plugin instance itself acting as its own listener
    Plugin(PluginHandle),
}

impl ListenerSlot {
    fn try_borrow_mut(&self) -> Option<RefMut<'_, dyn Any>> {
        match self {
            Self::Shared(cell, _) => cell.try_borrow_mut().ok(),
            Self::Plugin(handle) => handle
                .try_instance_mut()
                .map(|instance| RefMut::map(instance, |plugin| plugin.as_any_mut())),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Shared(_, name) => *name,
            Self::Plugin(handle) => handle.type_name(),
        }
    }
}

struct Binding {
    plugin: PluginId,
    plugin_name: String,
    slot: ListenerSlot,
    table: Rc<HandlerTable>,
}

/// Counters describing dispatcher activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub events_dispatched: u64,
    pub handlers_invoked: u64,
    pub bindings_replaced: u64,
}

/// Routes events to the handlers of bound listeners.
pub struct EventDispatcher {
    bindings: Vec<Binding>,
    /// Handler tables keyed by listener type, discovered on first bind
    tables: HashMap<TypeId, Rc<HandlerTable>>,
    stats: DispatchStats,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            tables: HashMap::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Bind `listener` to `plugin` and return a shared handle to it.
    pub fn bind<L: Listener>(&mut self, plugin: &PluginHandle, listener: L) -> Rc<RefCell<L>> {
        let listener = Rc::new(RefCell::new(listener));
        self.bind_shared(plugin, Rc::clone(&listener));
        listener
    }

    /// Bind a listener the caller already shares.
    pub fn bind_shared<L: Listener>(&mut self, plugin: &PluginHandle, listener: Rc<RefCell<L>>) {
        let slot: Rc<RefCell<dyn Any>> = listener;
        self.install::<L>(plugin, ListenerSlot::Shared(slot, type_name::<L>()));
    }

    /// Bind the plugin instance itself as its listener.
    ///
    /// Fails with [`EventError::ListenerTypeMismatch`] when the plugin is not
    /// an `L`.
    pub fn bind_plugin<L: Listener + Plugin>(&mut self, plugin: &PluginHandle) -> EventResult<()> {
        if !plugin.is::<L>() {
            return Err(EventError::ListenerTypeMismatch {
                plugin: plugin.name().to_string(),
                expected: type_name::<L>(),
                actual: plugin.type_name(),
            });
        }

        self.install::<L>(plugin, ListenerSlot::Plugin(plugin.clone()));
        Ok(())
    }

    fn install<L: Listener>(&mut self, plugin: &PluginHandle, slot: ListenerSlot) {
        let table = self.table_for::<L>();

        if let Some(index) = self.bindings.iter().position(|b| b.plugin == plugin.id()) {
            let previous = self.bindings.remove(index);
            self.stats.bindings_replaced += 1;
            warn!(
                "Plugin '{}' already has listener {} bound; replacing it with {}",
                plugin.name(),
                previous.table.listener_type(),
                table.listener_type()
            );
        }

        debug!(
            "Bound listener {} for plugin '{}' ({} handler(s))",
            table.listener_type(),
            plugin.name(),
            table.len()
        );
        self.bindings.push(Binding {
            plugin: plugin.id(),
            plugin_name: plugin.name().to_string(),
            slot,
            table,
        });
    }

    fn table_for<L: Listener>(&mut self) -> Rc<HandlerTable> {
        let table = self
            .tables
            .entry(TypeId::of::<L>())
            .or_insert_with(|| Rc::new(HandlerTable::discover::<L>()));
        Rc::clone(table)
    }

    /// Deliver `event` to every handler that accepts it and return how many
    /// handlers ran.
    ///
    /// Handlers run inline; one that never returns blocks the caller. The first
    /// failing handler stops dispatch. Handlers that already ran keep their
    /// side effects.
    pub fn dispatch(&mut self, event: &dyn Event) -> EventResult<usize> {
        self.stats.events_dispatched += 1;
        let mut invoked = 0;

        for binding in &self.bindings {
            let mut handlers = binding.table.accepting(event).peekable();
            if handlers.peek().is_none() {
                continue;
            }

            let mut listener =
                binding
                    .slot
                    .try_borrow_mut()
                    .ok_or_else(|| EventError::ListenerUnavailable {
                        plugin: binding.plugin_name.clone(),
                        listener: binding.table.listener_type(),
                    })?;

            for handler in handlers {
                debug!(
                    "Invoking {}::{} for {}",
                    binding.table.listener_type(),
                    handler.name(),
                    event.event_name()
                );
                match handler.invoke(&mut *listener, event) {
                    Some(Ok(())) => {
                        invoked += 1;
                        self.stats.handlers_invoked += 1;
                    }
                    Some(Err(source)) => {
                        self.stats.handlers_invoked += 1;
                        error!(
                            "Handler {} of plugin '{}' failed on {}: {}",
                            handler.name(),
                            binding.plugin_name,
                            event.event_name(),
                            source
                        );
                        return Err(EventError::HandlerInvocationFailed {
                            plugin: binding.plugin_name.clone(),
                            listener: binding.table.listener_type(),
                            handler: handler.name(),
                            event: event.event_name(),
                            source,
                        });
                    }
                    None => {
                        error!(
                            "Listener of plugin '{}' is {}, not {}; skipping dispatch",
                            binding.plugin_name,
                            binding.slot.type_name(),
                            binding.table.listener_type()
                        );
                        return Err(EventError::ListenerTypeMismatch {
                            plugin: binding.plugin_name.clone(),
                            expected: binding.table.listener_type(),
                            actual: binding.slot.type_name(),
                        });
                    }
                }
            }
        }

        Ok(invoked)
    }

    pub fn is_bound(&self, plugin: PluginId) -> bool {
        self.bindings.iter().any(|b| b.plugin == plugin)
    }

    /// Type name of the listener bound for `plugin`
    pub fn bound_listener(&self, plugin: PluginId) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|b| b.plugin == plugin)
            .map(|b| b.table.listener_type())
    }

    /// Bound plugins in dispatch order
    pub fn bound_plugins(&self) -> Vec<PluginId> {
        self.bindings.iter().map(|b| b.plugin).collect()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Listener types whose handlers have been discovered
    pub fn cached_listener_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> =
            self.tables.values().map(|t| t.listener_type()).collect();
        types.sort_unstable();
        types
    }

    /// The handlers `L` declares, discovering them if needed
    pub fn handlers_of<L: Listener>(&mut self) -> Vec<HandlerInfo> {
        self.table_for::<L>().handlers()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
