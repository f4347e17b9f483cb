//! The plugin contract and the shared handle through which loaded plugins are
//! reached.
//!
//! A plugin instance is exclusively owned by the registry that constructed
//! it. Everything else (the dispatcher, tests, the harness facade) holds a
//! [`PluginHandle`], a cheap clone of a reference-counted cell that exposes
//! the identity, descriptor and lifecycle state of the plugin and lends out
//! typed borrows of the instance on request.

use crate::command::{Command, CommandSender};
use crate::descriptor::PluginDescriptor;
use crate::error::BoxError;
use crate::types::{PluginId, PluginState, RegistryId};
use std::any::{Any, TypeId};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

// ============================================================================
// Plugin Contract
// ============================================================================

/// Upcasting helper so `dyn Plugin` values can be downcast to their
/// concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A plugin type loadable by the [`PluginRegistry`](crate::PluginRegistry).
///
/// Only `create` is required. The hooks default to doing nothing, and
/// `on_command` reports every command as unhandled unless overridden.
///
/// # Examples
///
/// ```rust
/// use plugin_system::{BoxError, Plugin, PluginInit};
///
/// struct Greeter {
///     enabled: bool,
/// }
///
/// impl Plugin for Greeter {
///     fn create(_init: PluginInit) -> Result<Self, BoxError> {
///         Ok(Self { enabled: false })
///     }
///
///     fn bundled_descriptor() -> Option<&'static str> {
///         Some("name = \"Greeter\"\nversion = \"1.0\"")
///     }
///
///     fn on_enable(&mut self) -> Result<(), BoxError> {
///         self.enabled = true;
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: AsAny + 'static {
    /// Construct the plugin.
    ///
    /// Errors and panics raised here are reported by the registry as a
    /// construction failure and nothing is registered.
    fn create(init: PluginInit) -> Result<Self, BoxError>
    where
        Self: Sized;

    /// The descriptor document shipped with this plugin type, if any.
    fn bundled_descriptor() -> Option<&'static str>
    where
        Self: Sized,
    {
        None
    }

    /// Called once the plugin's commands are published.
    fn on_load(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after the plugin has transitioned to `Enabled`.
    fn on_enable(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Handle one of the plugin's commands. Returns whether it was handled.
    fn on_command(
        &mut self,
        _sender: &CommandSender,
        _command: &Command,
        _label: &str,
        _args: &[String],
    ) -> Result<bool, BoxError> {
        Ok(false)
    }
}

/// Identifies the registry a plugin was constructed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderHandle {
    registry: RegistryId,
}

impl LoaderHandle {
    pub(crate) fn new(registry: RegistryId) -> Self {
        Self { registry }
    }

    pub fn registry_id(&self) -> RegistryId {
        self.registry
    }
}

/// Construction context handed to [`Plugin::create`].
#[derive(Debug, Clone)]
pub struct PluginInit {
    pub loader: LoaderHandle,
    pub descriptor: PluginDescriptor,
    /// Always `None` in the harness; plugins have no data folder
    pub data_folder: Option<PathBuf>,
    /// Always `None` in the harness; plugins are not backed by an archive
    pub file: Option<PathBuf>,
}

// ============================================================================
// Plugin Handle
// ============================================================================

struct PluginCell<P: ?Sized> {
    id: PluginId,
    registry: RegistryId,
    name: String,
    type_name: &'static str,
    type_id: TypeId,
    descriptor: PluginDescriptor,
    state: Cell<PluginState>,
    // Must stay the last field so the cell can be unsized to `dyn Plugin`.
    instance: RefCell<P>,
}

/// Shared reference to a plugin managed by a registry.
///
/// Handles compare equal when they refer to the same loaded plugin.
#[derive(Clone)]
pub struct PluginHandle {
    cell: Rc<PluginCell<dyn Plugin>>,
}

impl PluginHandle {
    pub(crate) fn new<P: Plugin>(
        registry: RegistryId,
        descriptor: PluginDescriptor,
        instance: P,
    ) -> Self {
        let cell: Rc<PluginCell<dyn Plugin>> = Rc::new(PluginCell {
            id: PluginId::new(),
            registry,
            name: descriptor.name.clone(),
            type_name: std::any::type_name::<P>(),
            type_id: TypeId::of::<P>(),
            descriptor,
            state: Cell::new(PluginState::Unloaded),
            instance: RefCell::new(instance),
        });
        Self { cell }
    }

    pub fn id(&self) -> PluginId {
        self.cell.id
    }

    /// Id of the registry that loaded this plugin
    pub fn registry_id(&self) -> RegistryId {
        self.cell.registry
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.cell.descriptor
    }

    /// Rust type name of the plugin instance
    pub fn type_name(&self) -> &'static str {
        self.cell.type_name
    }

    pub fn state(&self) -> PluginState {
        self.cell.state.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.state().is_active()
    }

    /// Whether the plugin instance is of type `P`
    pub fn is<P: Plugin>(&self) -> bool {
        self.cell.type_id == TypeId::of::<P>()
    }

    /// Borrow the instance as `P`.
    ///
    /// Returns `None` if the instance is not a `P` or is currently mutably
    /// borrowed.
    pub fn borrow<P: Plugin>(&self) -> Option<Ref<'_, P>> {
        let instance = self.cell.instance.try_borrow().ok()?;
        Ref::filter_map(instance, |plugin| plugin.as_any().downcast_ref::<P>()).ok()
    }

    /// Mutably borrow the instance as `P`.
    ///
    /// Returns `None` if the instance is not a `P` or is already borrowed.
    pub fn borrow_mut<P: Plugin>(&self) -> Option<RefMut<'_, P>> {
        let instance = self.cell.instance.try_borrow_mut().ok()?;
        RefMut::filter_map(instance, |plugin| plugin.as_any_mut().downcast_mut::<P>()).ok()
    }

    /// Mutably borrow the type-erased instance, or `None` if already borrowed
    pub fn try_instance_mut(&self) -> Option<RefMut<'_, dyn Plugin>> {
        self.cell.instance.try_borrow_mut().ok()
    }

    /// Run `f` against the type-erased instance, or return `None` if the
    /// instance is already borrowed.
    pub(crate) fn with_instance<R>(&self, f: impl FnOnce(&mut dyn Plugin) -> R) -> Option<R> {
        let mut instance = self.cell.instance.try_borrow_mut().ok()?;
        Some(f(&mut *instance))
    }

    pub(crate) fn set_state(&self, state: PluginState) {
        self.cell.state.set(state);
    }
}

impl PartialEq for PluginHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for PluginHandle {}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("type", &self.type_name())
            .field("state", &self.state())
            .finish()
    }
}
