//! The plugin registry: loading, enabling and looking up plugins

use crate::command::{CommandRegistry, CommandSender};
use crate::descriptor::{parse_commands, PluginDescriptor, DESCRIPTOR_FILE_NAME};
use crate::error::{PluginError, PluginResult};
use crate::plugin::{LoaderHandle, Plugin, PluginHandle, PluginInit};
use crate::types::{PluginState, RegistryId};
use std::any::{type_name, Any};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Owns every plugin it loads along with the commands they publish.
///
/// Registries are plain values. Two registries never share plugins,
/// commands or names.
#[derive(Debug)]
pub struct PluginRegistry {
    id: RegistryId,
    /// Loaded plugins in load order
    plugins: Vec<PluginHandle>,
    commands: CommandRegistry,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            id: RegistryId::new(),
            plugins: Vec::new(),
            commands: CommandRegistry::new(),
        }
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Handle given to plugins constructed by this registry
    pub fn loader(&self) -> LoaderHandle {
        LoaderHandle::new(self.id)
    }

    /// Load `P` using the descriptor bundled with the type.
    pub fn load<P: Plugin>(&mut self) -> PluginResult<PluginHandle> {
        let plugin_type = type_name::<P>();
        let text = P::bundled_descriptor().ok_or_else(|| {
            PluginError::missing_descriptor(
                plugin_type,
                format!("no bundled {DESCRIPTOR_FILE_NAME}"),
            )
        })?;
        let descriptor = PluginDescriptor::from_toml_str(text)
            .map_err(|e| PluginError::missing_descriptor(plugin_type, e.to_string()))?;

        self.load_with_descriptor::<P>(descriptor)
    }

    /// Construct `P`, publish its commands and run its load hook.
    ///
    /// On any failure the registry and its command registry are left exactly
    /// as they were before the call.
    pub fn load_with_descriptor<P: Plugin>(
        &mut self,
        descriptor: PluginDescriptor,
    ) -> PluginResult<PluginHandle> {
        let plugin_type = type_name::<P>();
        descriptor
            .validate()
            .map_err(|e| PluginError::missing_descriptor(plugin_type, e.to_string()))?;

        if self.get(&descriptor.name).is_some() {
            return Err(PluginError::DuplicatePluginName {
                name: descriptor.name,
            });
        }

        debug!("Constructing plugin '{}' ({})", descriptor.name, plugin_type);
        let init = PluginInit {
            loader: self.loader(),
            descriptor: descriptor.clone(),
            data_folder: None,
            file: None,
        };
        let instance = construct::<P>(init)?;
        let handle = PluginHandle::new(self.id, descriptor, instance);

        let commands = parse_commands(handle.id(), handle.name(), &handle.descriptor().commands)?;
        let published_before = self.commands.len();
        self.commands.record_all(&handle, commands);

        if let Err(err) = run_load_hook(&handle) {
            error!("Plugin {} failed to load: {}", handle.name(), err);
            self.commands.truncate(published_before);
            return Err(err);
        }

        handle.set_state(PluginState::Loaded);
        self.plugins.push(handle.clone());
        info!(
            "Loaded plugin: {} v{}",
            handle.name(),
            handle.descriptor().version
        );

        Ok(handle)
    }

    /// Not supported; plugins are never read from archives.
    pub fn load_from_file(&mut self, path: &Path) -> PluginResult<PluginHandle> {
        warn!("Refusing to load plugin from file {}", path.display());
        Err(PluginError::unsupported("load_from_file"))
    }

    /// Transition a loaded plugin to `Enabled` and run its enable hook.
    ///
    /// The state changes before the hook runs, so a plugin whose hook fails
    /// is still reported as enabled. A plugin whose instance is currently
    /// borrowed is left `Loaded` and can be enabled again later.
    pub fn enable(&mut self, plugin: &PluginHandle) -> PluginResult<()> {
        self.ensure_managed(plugin)?;

        let state = plugin.state();
        if !state.can_transition_to(PluginState::Enabled) {
            return Err(PluginError::InvalidPluginState {
                name: plugin.name().to_string(),
                state,
                operation: "enable",
            });
        }

        let mut instance = plugin
            .try_instance_mut()
            .ok_or_else(|| PluginError::PluginBusy {
                name: plugin.name().to_string(),
            })?;

        plugin.set_state(PluginState::Enabled);
        info!("Enabling plugin: {}", plugin.name());

        instance.on_enable().map_err(|source| {
            error!("Plugin {} failed to enable: {}", plugin.name(), source);
            PluginError::EnableHookFailed {
                name: plugin.name().to_string(),
                source,
            }
        })
    }

    /// Not supported by the harness.
    pub fn disable(&mut self, plugin: &PluginHandle) -> PluginResult<()> {
        warn!("Disabling plugin {} is not supported", plugin.name());
        Err(PluginError::unsupported("disable"))
    }

    /// Not supported by the harness.
    pub fn disable_all(&mut self) -> PluginResult<()> {
        Err(PluginError::unsupported("disable_all"))
    }

    /// Not supported by the harness.
    pub fn clear_plugins(&mut self) -> PluginResult<()> {
        Err(PluginError::unsupported("clear_plugins"))
    }

    /// Find a loaded plugin by its exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<PluginHandle> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Loaded plugins in load order
    pub fn list(&self) -> &[PluginHandle] {
        &self.plugins
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(|p| p.is_enabled())
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run the command answering to `label` on its owning plugin.
    ///
    /// Returns what the plugin's command hook returned.
    pub fn execute_command(
        &self,
        sender: &CommandSender,
        label: &str,
        args: &[String],
    ) -> PluginResult<bool> {
        let unknown = || PluginError::UnknownCommand {
            label: label.to_string(),
        };
        let command = self.commands.find(label).ok_or_else(unknown)?;
        let owner = self
            .plugins
            .iter()
            .find(|p| p.id() == command.owner())
            .ok_or_else(unknown)?;

        if !owner.is_enabled() {
            return Err(PluginError::InvalidPluginState {
                name: owner.name().to_string(),
                state: owner.state(),
                operation: "run commands of",
            });
        }

        debug!("{} issued /{} {:?}", sender.name(), label, args);
        owner
            .with_instance(|plugin| plugin.on_command(sender, command, label, args))
            .ok_or_else(|| PluginError::PluginBusy {
                name: owner.name().to_string(),
            })?
            .map_err(|source| PluginError::CommandFailed {
                command: command.name().to_string(),
                source,
            })
    }

    fn ensure_managed(&self, plugin: &PluginHandle) -> PluginResult<()> {
        if plugin.registry_id() == self.id && self.plugins.contains(plugin) {
            Ok(())
        } else {
            Err(PluginError::NotAnExtension {
                name: plugin.name().to_string(),
            })
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn construct<P: Plugin>(init: PluginInit) -> PluginResult<P> {
    let plugin_type = type_name::<P>();
    match catch_unwind(AssertUnwindSafe(|| P::create(init))) {
        Ok(Ok(plugin)) => Ok(plugin),
        Ok(Err(source)) => Err(PluginError::PluginConstructionFailed {
            plugin_type,
            source,
        }),
        Err(panic_info) => {
            error!("Plugin {} panicked during construction", plugin_type);
            Err(PluginError::PluginConstructionFailed {
                plugin_type,
                source: panic_message(panic_info).into(),
            })
        }
    }
}

/// Run the load hook, turning a panic into [`PluginError::LoadHookFailed`].
fn run_load_hook(handle: &PluginHandle) -> PluginResult<()> {
    let hook = handle
        .with_instance(|plugin| catch_unwind(AssertUnwindSafe(|| plugin.on_load())))
        .ok_or_else(|| PluginError::PluginBusy {
            name: handle.name().to_string(),
        })?;

    let source = match hook {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(source)) => source,
        Err(panic_info) => panic_message(panic_info).into(),
    };
    Err(PluginError::LoadHookFailed {
        name: handle.name().to_string(),
        source,
    })
}

fn panic_message(panic_info: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        format!("Plugin panicked: {}", s)
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        format!("Plugin panicked: {}", s)
    } else {
        "Plugin panicked with unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::error::BoxError;

    #[derive(Debug)]
    struct Tracker {
        loads: u32,
        enables: u32,
        registry: RegistryId,
    }

    impl Plugin for Tracker {
        fn create(init: PluginInit) -> Result<Self, BoxError> {
            assert!(init.data_folder.is_none());
            assert!(init.file.is_none());
            Ok(Self {
                loads: 0,
                enables: 0,
                registry: init.loader.registry_id(),
            })
        }

        fn bundled_descriptor() -> Option<&'static str> {
            Some("name = \"Tracker\"\nversion = \"0.1\"\n\n[commands.tracker]\naliases = \"t\"\n")
        }

        fn on_load(&mut self) -> Result<(), BoxError> {
            self.loads += 1;
            Ok(())
        }

        fn on_enable(&mut self) -> Result<(), BoxError> {
            self.enables += 1;
            Ok(())
        }

        fn on_command(
            &mut self,
            _sender: &CommandSender,
            command: &Command,
            _label: &str,
            args: &[String],
        ) -> Result<bool, BoxError> {
            if args.is_empty() {
                return Err(format!("{} needs an argument", command.name()).into());
            }
            Ok(true)
        }
    }

    struct Exploding;

    impl Plugin for Exploding {
        fn create(_init: PluginInit) -> Result<Self, BoxError> {
            panic!("boom")
        }
    }

    struct RefusesToLoad;

    impl Plugin for RefusesToLoad {
        fn create(_init: PluginInit) -> Result<Self, BoxError> {
            Ok(Self)
        }

        fn on_load(&mut self) -> Result<(), BoxError> {
            Err("not today".into())
        }
    }

    struct PanicsOnLoad;

    impl Plugin for PanicsOnLoad {
        fn create(_init: PluginInit) -> Result<Self, BoxError> {
            Ok(Self)
        }

        fn on_load(&mut self) -> Result<(), BoxError> {
            panic!("load exploded")
        }
    }

    struct Declines;

    impl Plugin for Declines {
        fn create(_init: PluginInit) -> Result<Self, BoxError> {
            Err("missing configuration".into())
        }
    }

    struct Malformed;

    impl Plugin for Malformed {
        fn create(_init: PluginInit) -> Result<Self, BoxError> {
            Ok(Self)
        }

        fn bundled_descriptor() -> Option<&'static str> {
            Some("name = \"Malformed\"\nversion = ")
        }
    }

    #[derive(Default)]
    struct FailsToEnable {
        attempts: u32,
    }

    impl Plugin for FailsToEnable {
        fn create(_init: PluginInit) -> Result<Self, BoxError> {
            Ok(Self::default())
        }

        fn on_enable(&mut self) -> Result<(), BoxError> {
            self.attempts += 1;
            Err("database offline".into())
        }
    }

    fn descriptor_with_command(name: &str, command: &str) -> PluginDescriptor {
        PluginDescriptor::new(name, "1.0").with_command(command, toml::Table::new())
    }

    #[test]
    fn test_load_bundled_descriptor() {
        let mut registry = PluginRegistry::new();
        let tracker = registry.load::<Tracker>().unwrap();

        assert_eq!(tracker.state(), PluginState::Loaded);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.commands().len(), 1);
        assert_eq!(registry.commands().list()[0].aliases(), ["t"]);

        let instance = tracker.borrow::<Tracker>().unwrap();
        assert_eq!(instance.loads, 1);
        assert_eq!(instance.enables, 0);
        assert_eq!(instance.registry, registry.id());
    }

    #[test]
    fn test_missing_bundled_descriptor() {
        let mut registry = PluginRegistry::new();
        let err = registry.load::<Exploding>().unwrap_err();
        assert!(matches!(err, PluginError::MissingDescriptor { .. }));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = PluginRegistry::new();
        registry.load::<Tracker>().unwrap();
        let err = registry
            .load_with_descriptor::<Tracker>(PluginDescriptor::new("Tracker", "2.0"))
            .unwrap_err();
        assert!(matches!(err, PluginError::DuplicatePluginName { ref name } if name == "Tracker"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_construction_panic_is_wrapped() {
        let mut registry = PluginRegistry::new();
        let err = registry
            .load_with_descriptor::<Exploding>(descriptor_with_command("Exploding", "x"))
            .unwrap_err();
        match err {
            PluginError::PluginConstructionFailed { plugin_type, source } => {
                assert!(plugin_type.ends_with("Exploding"));
                assert_eq!(source.to_string(), "Plugin panicked: boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty());
        assert!(registry.commands().is_empty());
    }

    #[test]
    fn test_load_hook_failure_rolls_back() {
        let mut registry = PluginRegistry::new();
        registry.load::<Tracker>().unwrap();

        let err = registry
            .load_with_descriptor::<RefusesToLoad>(descriptor_with_command("Refuses", "nope"))
            .unwrap_err();
        assert!(matches!(err, PluginError::LoadHookFailed { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.commands().len(), 1);
        assert!(registry.get("Refuses").is_none());
    }

    #[test]
    fn test_load_hook_panic_rolls_back() {
        let mut registry = PluginRegistry::new();
        let err = registry
            .load_with_descriptor::<PanicsOnLoad>(descriptor_with_command("Panics", "orphan"))
            .unwrap_err();
        match err {
            PluginError::LoadHookFailed { name, source } => {
                assert_eq!(name, "Panics");
                assert_eq!(source.to_string(), "Plugin panicked: load exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty());
        assert!(registry.commands().is_empty());
        assert!(registry.commands().find("orphan").is_none());
    }

    #[test]
    fn test_construction_error_is_wrapped() {
        let mut registry = PluginRegistry::new();
        let err = registry
            .load_with_descriptor::<Declines>(descriptor_with_command("Declines", "d"))
            .unwrap_err();
        match err {
            PluginError::PluginConstructionFailed { plugin_type, source } => {
                assert!(plugin_type.ends_with("Declines"));
                assert_eq!(source.to_string(), "missing configuration");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty());
        assert!(registry.commands().is_empty());
    }

    #[test]
    fn test_malformed_bundled_descriptor() {
        let mut registry = PluginRegistry::new();
        let err = registry.load::<Malformed>().unwrap_err();
        assert!(matches!(err, PluginError::MissingDescriptor { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_enable_hook_failure_keeps_enabled() {
        let mut registry = PluginRegistry::new();
        let plugin = registry
            .load_with_descriptor::<FailsToEnable>(PluginDescriptor::new("Flaky", "1.0"))
            .unwrap();

        let err = registry.enable(&plugin).unwrap_err();
        match err {
            PluginError::EnableHookFailed { ref name, ref source } => {
                assert_eq!(name, "Flaky");
                assert_eq!(source.to_string(), "database offline");
            }
            ref other => panic!("unexpected error: {other}"),
        }
        assert_eq!(plugin.state(), PluginState::Enabled);
        assert!(registry.is_enabled("Flaky"));
        assert_eq!(plugin.borrow::<FailsToEnable>().unwrap().attempts, 1);
    }

    #[test]
    fn test_enable_while_borrowed_can_be_retried() {
        let mut registry = PluginRegistry::new();
        let tracker = registry.load::<Tracker>().unwrap();

        let held = tracker.borrow_mut::<Tracker>().unwrap();
        let err = registry.enable(&tracker).unwrap_err();
        assert!(matches!(err, PluginError::PluginBusy { ref name } if name == "Tracker"));
        assert_eq!(tracker.state(), PluginState::Loaded);
        drop(held);

        registry.enable(&tracker).unwrap();
        assert_eq!(tracker.state(), PluginState::Enabled);
        assert_eq!(tracker.borrow::<Tracker>().unwrap().enables, 1);
    }

    #[test]
    fn test_command_on_borrowed_plugin_is_busy() {
        let mut registry = PluginRegistry::new();
        let tracker = registry.load::<Tracker>().unwrap();
        registry.enable(&tracker).unwrap();
        let args = vec!["arg".to_string()];

        let held = tracker.borrow_mut::<Tracker>().unwrap();
        let err = registry
            .execute_command(&CommandSender::Console, "tracker", &args)
            .unwrap_err();
        assert!(matches!(err, PluginError::PluginBusy { .. }));
        drop(held);

        assert!(registry
            .execute_command(&CommandSender::Console, "tracker", &args)
            .unwrap());
    }

    #[test]
    fn test_enable_lifecycle() {
        let mut registry = PluginRegistry::new();
        let tracker = registry.load::<Tracker>().unwrap();

        registry.enable(&tracker).unwrap();
        assert!(registry.is_enabled("Tracker"));
        assert_eq!(tracker.borrow::<Tracker>().unwrap().enables, 1);

        let err = registry.enable(&tracker).unwrap_err();
        assert!(matches!(
            err,
            PluginError::InvalidPluginState {
                state: PluginState::Enabled,
                ..
            }
        ));
        assert_eq!(tracker.borrow::<Tracker>().unwrap().enables, 1);
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut first = PluginRegistry::new();
        let mut second = PluginRegistry::new();
        let tracker = first.load::<Tracker>().unwrap();

        let err = second.enable(&tracker).unwrap_err();
        assert!(matches!(err, PluginError::NotAnExtension { .. }));
        assert_eq!(tracker.state(), PluginState::Loaded);
    }

    #[test]
    fn test_get_is_case_sensitive() {
        let mut registry = PluginRegistry::new();
        let tracker = registry.load::<Tracker>().unwrap();
        assert_eq!(registry.get("Tracker"), Some(tracker));
        assert!(registry.get("tracker").is_none());
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_execute_command() {
        let mut registry = PluginRegistry::new();
        let tracker = registry.load::<Tracker>().unwrap();
        let args = vec!["arg".to_string()];

        let err = registry
            .execute_command(&CommandSender::Console, "tracker", &args)
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidPluginState { .. }));

        registry.enable(&tracker).unwrap();
        assert!(registry
            .execute_command(&CommandSender::Console, "T", &args)
            .unwrap());

        let err = registry
            .execute_command(&CommandSender::Console, "tracker", &[])
            .unwrap_err();
        assert!(matches!(err, PluginError::CommandFailed { .. }));

        let err = registry
            .execute_command(&CommandSender::Console, "unknown", &args)
            .unwrap_err();
        assert!(matches!(err, PluginError::UnknownCommand { .. }));
    }

    #[test]
    fn test_unsupported_operations() {
        let mut registry = PluginRegistry::new();
        let tracker = registry.load::<Tracker>().unwrap();
        registry.enable(&tracker).unwrap();

        assert!(registry.disable(&tracker).unwrap_err().is_unsupported());
        assert!(registry.disable_all().unwrap_err().is_unsupported());
        assert!(registry.clear_plugins().unwrap_err().is_unsupported());
        assert!(registry
            .load_from_file(Path::new("plugins/tracker.jar"))
            .unwrap_err()
            .is_unsupported());
        assert_eq!(tracker.state(), PluginState::Enabled);
    }
}
