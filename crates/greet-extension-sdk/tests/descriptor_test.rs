//! Integration tests for the exported descriptor surface.
//!
//! Invokes `export_extension!` the way an extension crate would and drives
//! the generated symbols directly, without dynamic loading.

use greet_extension_sdk::prelude::*;
use greet_extension_sdk::export_extension;

struct Shout {
    metadata: ExtensionMetadata,
    commands: Vec<CommandDefinition>,
}

impl Shout {
    fn from_config(_config: &Value) -> Result<Self> {
        Ok(Self {
            metadata: ExtensionMetadata::new("test.shout", "Shout", semver::Version::new(0, 1, 0)),
            commands: vec![CommandDefinition {
                name: "shout".to_string(),
                parameters: vec![ParameterDefinition {
                    name: "text".to_string(),
                    param_type: ParamType::String,
                    required: true,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        })
    }
}

#[async_trait::async_trait]
impl Extension for Shout {
    fn metadata(&self) -> &ExtensionMetadata {
        &self.metadata
    }

    fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    async fn execute_command(&self, command: &str, args: &Value) -> Result<Value> {
        match command {
            "shout" => {
                let text = args
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ExtensionError::InvalidArguments("text".to_string()))?;
                Ok(Value::String(text.to_uppercase()))
            }
            other => Err(ExtensionError::CommandNotFound(other.to_string())),
        }
    }
}

export_extension!(
    Shout,
    id: "test.shout",
    name: "Shout",
    version: "0.1.0",
    description: "Uppercases its input",
    author: "SDK tests",
);

#[test]
fn test_abi_version_export() {
    assert_eq!(greet_extension_abi_version(), GREET_EXTENSION_ABI_VERSION);
}

#[test]
fn test_descriptor_export_decodes() {
    let descriptor = greet_extension_descriptor();
    assert!(!descriptor.is_null());

    let descriptor = unsafe { &*descriptor };
    assert_eq!(descriptor.abi_version, GREET_EXTENSION_ABI_VERSION);

    let metadata = unsafe { descriptor.decode() }.unwrap();
    assert_eq!(metadata.id, "test.shout");
    assert_eq!(metadata.name, "Shout");
    assert_eq!(metadata.version, semver::Version::new(0, 1, 0));
    assert_eq!(metadata.description, Some("Uppercases its input".to_string()));
    assert_eq!(metadata.author, Some("SDK tests".to_string()));
}

#[tokio::test]
async fn test_create_execute_destroy_via_descriptor() {
    let descriptor = unsafe { &*greet_extension_descriptor() };

    let instance = unsafe { (descriptor.create_fn)(std::ptr::null(), 0) };
    assert!(!instance.is_null());

    let extension = unsafe { &*(instance as *mut Box<dyn Extension>) };
    let result = extension
        .execute_command("shout", &serde_json::json!({"text": "quiet"}))
        .await
        .unwrap();
    assert_eq!(result, Value::String("QUIET".to_string()));

    let err = extension
        .execute_command("whisper", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtensionError::CommandNotFound(_)));

    unsafe { (descriptor.destroy_fn)(instance) };
}
