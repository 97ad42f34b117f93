//! Host-side support for Greet native extensions.
//!
//! Extensions are dynamic libraries (.so/.dylib/.dll) built against
//! `greet-extension-sdk`. The host loads them, verifies the ABI version,
//! decodes the exported descriptor, and drives them through the
//! [`Extension`](greet_extension_sdk::Extension) trait.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               ExtensionRegistry              │
//! │  - registration and lookup                   │
//! │  - command dispatch, health checks           │
//! │  - filesystem discovery                      │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │            NativeExtensionLoader             │
//! │  - libloading, ABI check, descriptor decode  │
//! │  - LoadedExtension (destroy-on-drop)         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use greet_host::ExtensionRegistry;
//!
//! let registry = ExtensionRegistry::new();
//! let metadata = registry.load_from_path(&path).await?;
//! let result = registry
//!     .execute_command(&metadata.id, "hello", &serde_json::json!({"name": "world"}))
//!     .await?;
//! ```

pub mod loader;
pub mod registry;

pub use loader::{LoadedExtension, NativeExtensionLoader};
pub use registry::{ExtensionInfo, ExtensionRegistry};

use std::sync::Arc;

use greet_extension_sdk::Extension;
use tokio::sync::RwLock;

/// Shared handle to a registered extension.
pub type DynExtension = Arc<RwLock<Box<dyn Extension>>>;

/// Check if a file looks like a native extension library.
pub fn is_native_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| matches!(ext, "so" | "dylib" | "dll"))
        .unwrap_or(false)
}
