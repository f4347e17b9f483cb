//! Command records and the command registry

use crate::plugin::PluginHandle;
use crate::types::PluginId;
use std::fmt;
use tracing::debug;

/// A command declared in a plugin descriptor.
///
/// Built once by the descriptor parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) owner: PluginId,
    pub(crate) owner_name: String,
    pub(crate) description: Option<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) permission: Option<String>,
    pub(crate) permission_message: Option<String>,
    pub(crate) usage: Option<String>,
}

impl Command {
    pub(crate) fn new(name: String, owner: PluginId, owner_name: &str) -> Self {
        Self {
            name,
            owner,
            owner_name: owner_name.to_string(),
            description: None,
            aliases: Vec::new(),
            permission: None,
            permission_message: None,
            usage: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the plugin that declared this command
    pub fn owner(&self) -> PluginId {
        self.owner
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn permission_message(&self) -> Option<&str> {
        self.permission_message.as_deref()
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Whether `label` names this command or one of its aliases.
    ///
    /// Matching ignores ASCII case, like command lookup on a real server.
    pub fn matches_label(&self, label: &str) -> bool {
        self.name.eq_ignore_ascii_case(label)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{} ({})", self.name, self.owner_name)
    }
}

/// Who issued a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSender {
    Console,
    Player(String),
}

impl CommandSender {
    pub fn name(&self) -> &str {
        match self {
            Self::Console => "CONSOLE",
            Self::Player(name) => name,
        }
    }
}

/// Every command published by loaded plugins, in publication order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a plugin's parsed commands as one batch
    pub fn record_all(&mut self, plugin: &PluginHandle, commands: Vec<Command>) {
        debug!(
            "Recording {} command(s) for plugin '{}'",
            commands.len(),
            plugin.name()
        );
        self.commands.extend(commands);
    }

    /// All published commands
    pub fn list(&self) -> &[Command] {
        &self.commands
    }

    /// First command, in publication order, answering to `label`
    pub fn find(&self, label: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.matches_label(label))
    }

    /// Commands owned by one plugin
    pub fn for_plugin(&self, owner: PluginId) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(move |command| command.owner == owner)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop everything published after the first `len` commands.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.commands.truncate(len);
    }
}
