//! Greet Extension SDK
//!
//! This SDK provides the types and macros for building native extensions
//! loadable by the Greet host runtime. Extensions are compiled as dynamic
//! libraries (`.so`/`.dylib`/`.dll`) that export a C-compatible descriptor;
//! the host resolves the descriptor and drives the extension through the
//! [`Extension`] trait.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use greet_extension_sdk::prelude::*;
//!
//! struct MyExtension {
//!     metadata: ExtensionMetadata,
//! }
//!
//! #[async_trait::async_trait]
//! impl Extension for MyExtension {
//!     // ...
//! }
//!
//! export_extension!(
//!     MyExtension,
//!     id: "com.example.my-extension",
//!     name: "My Extension",
//!     version: "1.0.0",
//!     description: "An example extension",
//!     author: "Example Author",
//! );
//! ```

pub mod descriptor;
#[macro_use]
pub mod macros;
pub mod types;

pub use descriptor::{CExtensionDescriptor, CreateFn, DestroyFn, GREET_EXTENSION_ABI_VERSION};
pub use types::{
    CommandDefinition, Extension, ExtensionError, ExtensionMetadata, ParamType,
    ParameterDefinition, Result,
};

/// Prelude module with common imports
pub mod prelude {
    pub use crate::descriptor::{CExtensionDescriptor, GREET_EXTENSION_ABI_VERSION};
    pub use crate::types::{
        CommandDefinition, Extension, ExtensionError, ExtensionMetadata, ParamType,
        ParameterDefinition, Result,
    };
    pub use serde_json::Value;
}

/// Build an extension instance from a host-supplied JSON config document.
///
/// This is the body of the generated create entry point: a null or empty
/// config decodes to `{}`, the builder is invoked, and the resulting
/// extension is boxed behind an opaque pointer. Failures are logged and
/// reported as a null return.
///
/// # Safety
/// `config_json`, when non-null, must point to `config_len` readable bytes.
pub unsafe fn instantiate<E, F>(config_json: *const u8, config_len: usize, build: F) -> *mut ()
where
    E: Extension + 'static,
    F: FnOnce(&serde_json::Value) -> Result<E>,
{
    let config_str = if config_json.is_null() || config_len == 0 {
        "{}"
    } else {
        let bytes = std::slice::from_raw_parts(config_json, config_len);
        match std::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("extension config is not UTF-8: {e}");
                return std::ptr::null_mut();
            }
        }
    };

    let config: serde_json::Value = match serde_json::from_str(config_str) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("extension config is not valid JSON: {e}");
            return std::ptr::null_mut();
        }
    };

    match build(&config) {
        Ok(extension) => {
            let handle: Box<Box<dyn Extension>> = Box::new(Box::new(extension));
            Box::into_raw(handle) as *mut ()
        }
        Err(e) => {
            tracing::error!("extension creation failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Tear down an instance produced by [`instantiate`]. Null is a no-op.
///
/// # Safety
/// `instance` must be null or a pointer returned by [`instantiate`] that
/// has not already been torn down.
pub unsafe fn teardown(instance: *mut ()) {
    if !instance.is_null() {
        drop(Box::from_raw(instance as *mut Box<dyn Extension>));
    }
}
