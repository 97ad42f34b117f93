//! Common types shared by extensions and the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameter data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Float,
    Integer,
    Boolean,
    #[default]
    String,
}

/// Parameter definition for commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<Value>,
}

/// Command definition.
///
/// Commands are the operations an extension exposes to the host. Each
/// command has a fixed name and a declared parameter list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

/// Extension metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    /// Unique extension identifier (e.g., "greet.hello")
    pub id: String,
    /// Display name
    pub name: String,
    /// Extension version
    pub version: semver::Version,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Homepage URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// License
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// File path the extension was loaded from (not serialized)
    #[serde(skip)]
    pub file_path: Option<std::path::PathBuf>,
}

impl ExtensionMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version,
            description: None,
            author: None,
            homepage: None,
            license: None,
            file_path: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_file_path(mut self, path: std::path::PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }
}

/// The Extension trait that all extensions implement.
///
/// Extensions declare commands and execute them on behalf of the host.
/// Implementations must be `Send + Sync`: the host may invoke commands
/// from any thread of its runtime.
#[async_trait::async_trait]
pub trait Extension: Send + Sync {
    /// Get extension metadata
    fn metadata(&self) -> &ExtensionMetadata;

    /// Declare commands supported by this extension
    fn commands(&self) -> &[CommandDefinition];

    /// Execute a command with the given arguments
    async fn execute_command(&self, command: &str, args: &Value) -> Result<Value>;

    /// Optional: Health check
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Extension errors, shared by both sides of the ABI.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Load failed: {0}")]
    LoadFailed(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Incompatible ABI version: expected {expected}, got {got}")]
    IncompatibleVersion { expected: u32, got: u32 },

    #[error("Null pointer")]
    NullPointer,

    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for ExtensionError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for ExtensionError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Result type for extension operations
pub type Result<T> = std::result::Result<T, ExtensionError>;
