//! Shared fixtures for the mock server integration tests

#![allow(dead_code)]

use mock_server::events::{BlockBreakEvent, BlockEvent, PlayerInteractEvent};
use mock_server::{
    BoxError, Command, CommandSender, HandlerResult, HandlerSet, Listener, Plugin, PluginInit,
    RegistryId,
};

pub const TEST_PLUGIN_DESCRIPTOR: &str = r#"
name = "TestPlugin"
version = "1.0.0"
main = "mock_server::tests::TestPlugin"
description = "Plugin used by the mock server integration tests"
authors = ["mock_server"]

[commands.testcommand]
description = "A test command"
aliases = ["tc", "test"]
permission = "testplugin.testcommand"
permission-message = "You do not have permission to run this command"
usage = "/<command> [args]"

[commands.other]
aliases = "o"
"#;

/// A plugin that records every lifecycle hook, command and event it sees.
///
/// It is also its own listener. `unannotated_player_interact` has a handler
/// signature but is deliberately not declared, so it must never run.
#[derive(Debug)]
pub struct TestPlugin {
    pub registry_id: RegistryId,
    pub on_load_executed: bool,
    pub on_enable_executed: bool,
    pub command_sender: Option<CommandSender>,
    pub command: Option<String>,
    pub command_label: Option<String>,
    pub command_arguments: Vec<String>,
    pub command_returns: bool,
    pub unannotated_player_interact_executed: u32,
    pub annotated_player_interact_executed: u32,
    pub annotated_block_break_executed: u32,
}

impl TestPlugin {
    pub fn unannotated_player_interact(&mut self, _event: &PlayerInteractEvent) -> HandlerResult {
        self.unannotated_player_interact_executed += 1;
        Ok(())
    }

    pub fn on_player_interact(&mut self, _event: &PlayerInteractEvent) -> HandlerResult {
        self.annotated_player_interact_executed += 1;
        Ok(())
    }

    pub fn on_block_break(&mut self, _event: &BlockBreakEvent) -> HandlerResult {
        self.annotated_block_break_executed += 1;
        Ok(())
    }
}

impl Plugin for TestPlugin {
    fn create(init: PluginInit) -> Result<Self, BoxError> {
        Ok(Self {
            registry_id: init.loader.registry_id(),
            on_load_executed: false,
            on_enable_executed: false,
            command_sender: None,
            command: None,
            command_label: None,
            command_arguments: Vec::new(),
            command_returns: true,
            unannotated_player_interact_executed: 0,
            annotated_player_interact_executed: 0,
            annotated_block_break_executed: 0,
        })
    }

    fn bundled_descriptor() -> Option<&'static str> {
        Some(TEST_PLUGIN_DESCRIPTOR)
    }

    fn on_load(&mut self) -> Result<(), BoxError> {
        self.on_load_executed = true;
        Ok(())
    }

    fn on_enable(&mut self) -> Result<(), BoxError> {
        self.on_enable_executed = true;
        Ok(())
    }

    fn on_command(
        &mut self,
        sender: &CommandSender,
        command: &Command,
        label: &str,
        args: &[String],
    ) -> Result<bool, BoxError> {
        self.command_sender = Some(sender.clone());
        self.command = Some(command.name().to_string());
        self.command_label = Some(label.to_string());
        self.command_arguments = args.to_vec();
        Ok(self.command_returns)
    }
}

impl Listener for TestPlugin {
    fn handlers(set: &mut HandlerSet<Self>) {
        set.on("on_player_interact", Self::on_player_interact)
            .on("on_block_break", Self::on_block_break);
    }
}

/// A standalone listener recording the order in which it sees events.
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub log: Vec<String>,
}

impl RecordingListener {
    fn on_interact(&mut self, event: &PlayerInteractEvent) -> HandlerResult {
        self.log.push(format!("interact:{}", event.player()));
        Ok(())
    }

    fn on_block(&mut self, event: &BlockEvent) -> HandlerResult {
        self.log.push(format!("block:{}", event.material));
        Ok(())
    }

    fn on_block_break(&mut self, event: &BlockBreakEvent) -> HandlerResult {
        self.log.push(format!("break:{}", event.player));
        Ok(())
    }
}

impl Listener for RecordingListener {
    fn handlers(set: &mut HandlerSet<Self>) {
        set.on("on_interact", Self::on_interact)
            .on("on_block", Self::on_block)
            .on("on_block_break", Self::on_block_break);
    }
}

/// A listener whose block handler always fails.
#[derive(Debug, Default)]
pub struct FailingListener {
    pub attempts: u32,
}

impl FailingListener {
    fn on_block(&mut self, _event: &BlockEvent) -> HandlerResult {
        self.attempts += 1;
        Err("block handling failed".into())
    }
}

impl Listener for FailingListener {
    fn handlers(set: &mut HandlerSet<Self>) {
        set.on("on_block", Self::on_block);
    }
}

/// A plugin with nothing but a constructor.
pub struct EmptyPlugin;

impl Plugin for EmptyPlugin {
    fn create(_init: PluginInit) -> Result<Self, BoxError> {
        Ok(EmptyPlugin)
    }
}
