//! Plugin descriptors and the command descriptor parser
//!
//! A descriptor is the declarative metadata bundled with a plugin. Its most
//! important part is the command table, which [`parse_commands`] turns into
//! validated [`Command`] records while the plugin is being loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::Command;
use crate::error::{PluginError, PluginResult};
use crate::types::PluginId;

/// Field keys accepted inside a command entry.
pub const RECOGNIZED_COMMAND_KEYS: [&str; 5] = [
    "description",
    "aliases",
    "permission",
    "permission-message",
    "usage",
];

/// Conventional file name of a bundled descriptor.
pub const DESCRIPTOR_FILE_NAME: &str = "plugin.toml";

/// Reasons a descriptor document could not be turned into a [`PluginDescriptor`].
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("malformed descriptor: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid descriptor: {0}")]
    Invalid(String),
}

/// Declarative plugin metadata.
///
/// Unknown top-level keys are ignored. The command table keeps declaration
/// order, so commands are published in the order the author wrote them.
///
/// ```toml
/// name = "Test"
/// version = "1.0.0"
///
/// [commands.greet]
/// description = "Greets a player"
/// aliases = ["hi", "hello"]
/// usage = "/<command> [player]"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin name, unique within a registry
    pub name: String,
    /// Plugin version string
    pub version: String,
    /// Entry point of the plugin, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Command name to field table
    #[serde(default)]
    pub commands: toml::Table,
}

impl PluginDescriptor {
    /// Create a descriptor without any commands
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            main: None,
            description: None,
            authors: Vec::new(),
            website: None,
            commands: toml::Table::new(),
        }
    }

    /// Parse and validate a descriptor document
    pub fn from_toml_str(text: &str) -> Result<Self, DescriptorError> {
        let descriptor: Self = toml::from_str(text)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Declare a command with its raw field table
    pub fn with_command(mut self, name: impl Into<String>, fields: toml::Table) -> Self {
        self.commands.insert(name.into(), toml::Value::Table(fields));
        self
    }

    /// Check the fields every plugin must declare
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::Invalid("name must not be empty".to_string()));
        }
        if let Some(c) = self
            .name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-')))
        {
            return Err(DescriptorError::Invalid(format!(
                "name '{}' contains invalid character '{}'",
                self.name, c
            )));
        }
        if self.version.trim().is_empty() {
            return Err(DescriptorError::Invalid(format!(
                "plugin '{}' must declare a version",
                self.name
            )));
        }
        Ok(())
    }
}

/// Turn a descriptor command table into [`Command`] records owned by `owner`.
///
/// Either every entry parses and the full list is returned, or the first
/// offending entry aborts the parse and nothing is returned.
pub fn parse_commands(
    owner: PluginId,
    owner_name: &str,
    commands: &toml::Table,
) -> PluginResult<Vec<Command>> {
    let mut parsed = Vec::with_capacity(commands.len());

    for (name, entry) in commands {
        let fields = entry
            .as_table()
            .ok_or_else(|| PluginError::InvalidDescriptorValue {
                command: name.clone(),
                key: name.clone(),
                expected: "a table of command fields",
            })?;

        let mut command = Command::new(name.clone(), owner, owner_name);
        for (key, value) in fields {
            if !RECOGNIZED_COMMAND_KEYS.contains(&key.as_str()) {
                return Err(PluginError::UnrecognizedDescriptorKey {
                    command: name.clone(),
                    key: key.clone(),
                });
            }
            match key.as_str() {
                "aliases" => command.aliases = parse_aliases(name, value)?,
                "description" => command.description = Some(expect_string(name, key, value)?),
                "permission" => command.permission = Some(expect_string(name, key, value)?),
                "permission-message" => {
                    command.permission_message = Some(expect_string(name, key, value)?)
                }
                "usage" => command.usage = Some(expect_string(name, key, value)?),
                // Filtered above
                _ => {}
            }
        }
        parsed.push(command);
    }

    Ok(parsed)
}

fn expect_string(command: &str, key: &str, value: &toml::Value) -> PluginResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| PluginError::InvalidDescriptorValue {
            command: command.to_string(),
            key: key.to_string(),
            expected: "a string",
        })
}

/// `aliases` accepts a single string or a list of strings.
fn parse_aliases(command: &str, value: &toml::Value) -> PluginResult<Vec<String>> {
    let invalid = || PluginError::InvalidDescriptorValue {
        command: command.to_string(),
        key: "aliases".to_string(),
        expected: "a string or a list of strings",
    };

    match value {
        toml::Value::String(alias) => Ok(vec![alias.clone()]),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> toml::Table {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_every_recognized_key_is_applied() {
        let mut fields = toml::Table::new();
        for key in RECOGNIZED_COMMAND_KEYS {
            fields.insert(key.to_string(), toml::Value::String(format!("{key}-value")));
        }
        let mut commands = toml::Table::new();
        commands.insert("all".to_string(), toml::Value::Table(fields));

        let parsed = parse_commands(PluginId::new(), "Owner", &commands).unwrap();
        let command = &parsed[0];
        assert_eq!(command.description(), Some("description-value"));
        assert_eq!(command.aliases(), ["aliases-value"]);
        assert_eq!(command.permission(), Some("permission-value"));
        assert_eq!(command.permission_message(), Some("permission-message-value"));
        assert_eq!(command.usage(), Some("usage-value"));
    }

    #[test]
    fn test_descriptor_from_toml() {
        let descriptor = PluginDescriptor::from_toml_str(
            r#"
name = "Test"
version = "1.0.0"
main = "demo::TestPlugin"
authors = ["seeseemelk"]
unknown_top_level = true

[commands.greet]
description = "Greets"

[commands.warp]
usage = "/warp <name>"
"#,
        )
        .unwrap();

        assert_eq!(descriptor.name, "Test");
        assert_eq!(descriptor.main.as_deref(), Some("demo::TestPlugin"));
        assert_eq!(descriptor.authors, vec!["seeseemelk"]);
        let names: Vec<&str> = descriptor.commands.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["greet", "warp"]);
    }

    #[test]
    fn test_descriptor_validation() {
        assert!(matches!(
            PluginDescriptor::from_toml_str("version = \"1.0\""),
            Err(DescriptorError::Parse(_))
        ));
        assert!(matches!(
            PluginDescriptor::from_toml_str("name = \"\"\nversion = \"1.0\""),
            Err(DescriptorError::Invalid(_))
        ));
        assert!(matches!(
            PluginDescriptor::from_toml_str("name = \"bad/name\"\nversion = \"1.0\""),
            Err(DescriptorError::Invalid(_))
        ));
        assert!(PluginDescriptor::new("Fine Name_1.x-y", "1").validate().is_ok());
    }

    #[test]
    fn test_parse_all_recognized_fields() {
        let commands = table(
            r#"
[greet]
description = "Greets a player"
aliases = ["hi", "hello"]
permission = "test.greet"
permission-message = "You may not greet"
usage = "/<command> [player]"
"#,
        );
        let owner = PluginId::new();
        let parsed = parse_commands(owner, "Test", &commands).unwrap();

        assert_eq!(parsed.len(), 1);
        let greet = &parsed[0];
        assert_eq!(greet.name(), "greet");
        assert_eq!(greet.owner(), owner);
        assert_eq!(greet.owner_name(), "Test");
        assert_eq!(greet.description(), Some("Greets a player"));
        assert_eq!(greet.aliases(), ["hi", "hello"]);
        assert_eq!(greet.permission(), Some("test.greet"));
        assert_eq!(greet.permission_message(), Some("You may not greet"));
        assert_eq!(greet.usage(), Some("/<command> [player]"));
    }

    #[test]
    fn test_single_alias_normalizes_to_list() {
        let single = parse_commands(PluginId::new(), "Test", &table("[a]\naliases = \"x\"")).unwrap();
        let list = parse_commands(PluginId::new(), "Test", &table("[a]\naliases = [\"x\"]")).unwrap();
        assert_eq!(single[0].aliases(), list[0].aliases());
        assert_eq!(single[0].aliases(), ["x"]);
    }

    #[test]
    fn test_absent_fields_stay_unset() {
        let parsed = parse_commands(PluginId::new(), "Test", &table("[bare]")).unwrap();
        let bare = &parsed[0];
        assert_eq!(bare.description(), None);
        assert!(bare.aliases().is_empty());
        assert_eq!(bare.permission(), None);
        assert_eq!(bare.permission_message(), None);
        assert_eq!(bare.usage(), None);
    }

    #[test]
    fn test_unrecognized_key_aborts_parse() {
        let commands = table("[ok]\ndescription = \"fine\"\n\n[bad]\ncolour = \"red\"");
        let err = parse_commands(PluginId::new(), "Test", &commands).unwrap_err();
        match err {
            PluginError::UnrecognizedDescriptorKey { command, key } => {
                assert_eq!(command, "bad");
                assert_eq!(key, "colour");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_value_types() {
        let err = parse_commands(PluginId::new(), "Test", &table("[a]\nusage = 3")).unwrap_err();
        assert!(matches!(err, PluginError::InvalidDescriptorValue { ref key, .. } if key == "usage"));

        let err = parse_commands(PluginId::new(), "Test", &table("[a]\naliases = [1]")).unwrap_err();
        assert!(matches!(err, PluginError::InvalidDescriptorValue { ref key, .. } if key == "aliases"));

        let err = parse_commands(PluginId::new(), "Test", &table("a = \"not a table\"")).unwrap_err();
        assert!(matches!(err, PluginError::InvalidDescriptorValue { .. }));
    }
}
