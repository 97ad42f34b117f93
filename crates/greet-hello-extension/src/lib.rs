//! Greeting extension for the Greet host runtime.
//!
//! Exposes a single command, `hello`, that takes a string argument and
//! returns it prefixed with `"hello "`. The command accepts either a bare
//! JSON string (positional form) or an object with a `"name"` key; a
//! missing or non-string argument is an `InvalidArguments` error rather
//! than being coerced.

use greet_extension_sdk::prelude::*;
use greet_extension_sdk::export_extension;

/// The greeting prefix applied to every input.
pub const GREETING_PREFIX: &str = "hello ";

/// Build the greeting for `name`.
pub fn greet(name: &str) -> String {
    format!("{GREETING_PREFIX}{name}")
}

/// Extension wrapper exposing [`greet`] as the `hello` command.
pub struct HelloExtension {
    metadata: ExtensionMetadata,
    commands: Vec<CommandDefinition>,
}

impl HelloExtension {
    /// Create the extension. The configuration document is accepted but
    /// ignored: the greeting prefix is fixed.
    pub fn from_config(_config: &Value) -> Result<Self> {
        Ok(Self {
            metadata: ExtensionMetadata::new(
                "greet.hello",
                "Hello Greeting",
                semver::Version::new(0, 1, 0),
            )
            .with_description("Returns its argument prefixed with \"hello \"")
            .with_author("Greet Contributors")
            .with_license("Apache-2.0"),
            commands: vec![CommandDefinition {
                name: "hello".to_string(),
                display_name: "Hello".to_string(),
                description: "Greet a name".to_string(),
                parameters: vec![ParameterDefinition {
                    name: "name".to_string(),
                    display_name: "Name".to_string(),
                    description: "The name to greet".to_string(),
                    param_type: ParamType::String,
                    required: true,
                    default_value: None,
                }],
            }],
        })
    }

    /// Extract the name argument from either accepted shape.
    fn name_arg(args: &Value) -> Result<&str> {
        match args {
            Value::String(s) => Ok(s.as_str()),
            Value::Object(map) => map
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ExtensionError::InvalidArguments("\"name\" must be a string".to_string())
                }),
            _ => Err(ExtensionError::InvalidArguments(
                "expected a string or an object with a \"name\" key".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl Extension for HelloExtension {
    fn metadata(&self) -> &ExtensionMetadata {
        &self.metadata
    }

    fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    async fn execute_command(&self, command: &str, args: &Value) -> Result<Value> {
        match command {
            "hello" => {
                let name = Self::name_arg(args)?;
                let greeting = greet(name);
                tracing::debug!(name, "greeting produced");
                Ok(Value::String(greeting))
            }
            other => Err(ExtensionError::CommandNotFound(other.to_string())),
        }
    }
}

export_extension!(
    HelloExtension,
    id: "greet.hello",
    name: "Hello Greeting",
    version: "0.1.0",
    description: "Returns its argument prefixed with \"hello \"",
    author: "Greet Contributors",
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_greet_appends_prefix() {
        assert_eq!(greet("world"), "hello world");
        assert_eq!(greet("Greet"), "hello Greet");
    }

    #[test]
    fn test_greet_empty_string() {
        assert_eq!(greet(""), "hello ");
    }

    #[test]
    fn test_metadata_and_commands() {
        let ext = HelloExtension::from_config(&json!({})).unwrap();
        assert_eq!(ext.metadata().id, "greet.hello");

        let commands = ext.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "hello");
        assert_eq!(commands[0].parameters[0].name, "name");
        assert!(commands[0].parameters[0].required);
    }

    #[tokio::test]
    async fn test_hello_with_object_args() {
        let ext = HelloExtension::from_config(&json!({})).unwrap();
        let result = ext
            .execute_command("hello", &json!({"name": "world"}))
            .await
            .unwrap();
        assert_eq!(result, json!("hello world"));
    }

    #[tokio::test]
    async fn test_hello_with_positional_string() {
        let ext = HelloExtension::from_config(&json!({})).unwrap();
        let result = ext.execute_command("hello", &json!("world")).await.unwrap();
        assert_eq!(result, json!("hello world"));
    }

    #[tokio::test]
    async fn test_hello_empty_name() {
        let ext = HelloExtension::from_config(&json!({})).unwrap();
        let result = ext
            .execute_command("hello", &json!({"name": ""}))
            .await
            .unwrap();
        assert_eq!(result, json!("hello "));
    }

    #[tokio::test]
    async fn test_missing_name_is_invalid_arguments() {
        let ext = HelloExtension::from_config(&json!({})).unwrap();
        let err = ext.execute_command("hello", &json!({})).await.unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_non_string_name_is_invalid_arguments() {
        let ext = HelloExtension::from_config(&json!({})).unwrap();

        let err = ext
            .execute_command("hello", &json!({"name": 42}))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidArguments(_)));

        let err = ext.execute_command("hello", &json!(42)).await.unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let ext = HelloExtension::from_config(&json!({})).unwrap();
        let err = ext
            .execute_command("goodbye", &json!({"name": "world"}))
            .await
            .unwrap_err();
        match err {
            ExtensionError::CommandNotFound(cmd) => assert_eq!(cmd, "goodbye"),
            other => panic!("expected CommandNotFound, got {other}"),
        }
    }

    #[test]
    fn test_exported_descriptor() {
        let descriptor = unsafe { &*greet_extension_descriptor() };
        assert_eq!(descriptor.abi_version, greet_extension_abi_version());

        let metadata = unsafe { descriptor.decode() }.unwrap();
        assert_eq!(metadata.id, "greet.hello");
    }
}
