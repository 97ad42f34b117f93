//! Native extension loader using libloading.
//!
//! Loads extension dynamic libraries (.so, .dylib, .dll), verifies the ABI
//! version, decodes the exported descriptor, and instantiates the extension
//! through its create entry point.

use std::path::{Path, PathBuf};

use greet_extension_sdk::descriptor::{CExtensionDescriptor, DestroyFn, GREET_EXTENSION_ABI_VERSION};
use greet_extension_sdk::{CommandDefinition, Extension, ExtensionError, ExtensionMetadata, Result};
use libloading::{Library, Symbol};
use serde_json::Value;

use crate::is_native_extension;

type AbiVersionFn = unsafe extern "C" fn() -> u32;
type DescriptorFn = unsafe extern "C" fn() -> *const CExtensionDescriptor;

const ABI_VERSION_SYMBOL: &[u8] = b"greet_extension_abi_version";
const DESCRIPTOR_SYMBOL: &[u8] = b"greet_extension_descriptor";

/// Loader for native extensions.
pub struct NativeExtensionLoader {
    /// Directories extensions may be loaded from. Empty means no
    /// restriction, for development use.
    search_paths: Vec<PathBuf>,
}

impl NativeExtensionLoader {
    /// Create a new loader with no search-path restriction.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
        }
    }

    /// Add a search path. Once any path is configured, only libraries
    /// under a configured path may be loaded.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Get all search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Load an extension with an empty configuration.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedExtension> {
        self.load_with_config(path, &Value::Object(Default::default()))
    }

    /// Load an extension, passing `config` to its create entry point.
    pub fn load_with_config(
        &self,
        path: impl AsRef<Path>,
        config: &Value,
    ) -> Result<LoadedExtension> {
        let path = self.validate_path(path.as_ref())?;
        let library = open_library(&path)?;

        let (metadata, create_fn, destroy_fn) = {
            let descriptor = resolve_descriptor(&library)?;
            let metadata = unsafe { descriptor.decode() }?.with_file_path(path.clone());
            (metadata, descriptor.create_fn, descriptor.destroy_fn)
        };

        let config_json = serde_json::to_vec(config)?;
        let instance = unsafe { create_fn(config_json.as_ptr(), config_json.len()) };
        if instance.is_null() {
            return Err(ExtensionError::LoadFailed(format!(
                "extension {} refused to instantiate",
                metadata.id
            )));
        }

        tracing::info!(id = %metadata.id, path = %path.display(), "loaded native extension");

        Ok(LoadedExtension {
            metadata,
            instance: instance as *mut Box<dyn Extension>,
            destroy_fn,
            _library: library,
        })
    }

    /// Read an extension's metadata without instantiating it.
    pub fn load_metadata(&self, path: impl AsRef<Path>) -> Result<ExtensionMetadata> {
        let path = self.validate_path(path.as_ref())?;
        let library = open_library(&path)?;
        let descriptor = resolve_descriptor(&library)?;
        let metadata = unsafe { descriptor.decode() }?.with_file_path(path);
        Ok(metadata)
    }

    /// List candidate extension libraries in a directory.
    pub fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        let mut extensions = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if is_native_extension(&path) {
                    extensions.push(path);
                }
            }
        }
        extensions
    }

    fn validate_path(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(ExtensionError::NotFound(path.display().to_string()));
        }
        if !path.is_file() {
            return Err(ExtensionError::InvalidFormat(format!(
                "not a file: {}",
                path.display()
            )));
        }
        if !is_native_extension(path) {
            return Err(ExtensionError::InvalidFormat(format!(
                "not a native library: {}",
                path.display()
            )));
        }

        let canonical = path.canonicalize()?;

        if !self.search_paths.is_empty() {
            let allowed = self.search_paths.iter().any(|search_path| {
                search_path
                    .canonicalize()
                    .map(|sp| canonical.starts_with(sp))
                    .unwrap_or(false)
            });
            if !allowed {
                return Err(ExtensionError::LoadFailed(format!(
                    "path is outside the configured search paths: {}",
                    path.display()
                )));
            }
        }

        Ok(canonical)
    }
}

impl Default for NativeExtensionLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn open_library(path: &Path) -> Result<Library> {
    unsafe { Library::new(path) }
        .map_err(|e| ExtensionError::LoadFailed(format!("{}: {e}", path.display())))
}

/// Resolve and verify the descriptor exports. The returned reference
/// borrows from `library`.
fn resolve_descriptor(library: &Library) -> Result<&CExtensionDescriptor> {
    let abi_version = unsafe {
        let abi_version: Symbol<AbiVersionFn> = library
            .get(ABI_VERSION_SYMBOL)
            .map_err(|e| ExtensionError::SymbolNotFound(format!("greet_extension_abi_version: {e}")))?;
        abi_version()
    };
    if abi_version != GREET_EXTENSION_ABI_VERSION {
        return Err(ExtensionError::IncompatibleVersion {
            expected: GREET_EXTENSION_ABI_VERSION,
            got: abi_version,
        });
    }

    let descriptor = unsafe {
        let descriptor: Symbol<DescriptorFn> = library
            .get(DESCRIPTOR_SYMBOL)
            .map_err(|e| ExtensionError::SymbolNotFound(format!("greet_extension_descriptor: {e}")))?;
        descriptor()
    };
    if descriptor.is_null() {
        return Err(ExtensionError::NullPointer);
    }

    Ok(unsafe { &*descriptor })
}

/// A dynamically loaded extension.
///
/// Keeps the library handle alive for as long as the instance exists and
/// tears the instance down through the extension's destroy entry point on
/// drop. Implements [`Extension`] by delegating to the loaded instance, so
/// it can be registered like any in-process extension.
#[derive(Debug)]
pub struct LoadedExtension {
    metadata: ExtensionMetadata,
    instance: *mut Box<dyn Extension>,
    destroy_fn: DestroyFn,
    // Declared last: the instance must be destroyed before the library
    // that holds its code is unloaded.
    _library: Library,
}

// The instance is a `Box<dyn Extension>` and `Extension: Send + Sync`; the
// raw pointer only exists because it crossed the C ABI.
unsafe impl Send for LoadedExtension {}
unsafe impl Sync for LoadedExtension {}

impl LoadedExtension {
    fn inner(&self) -> &dyn Extension {
        unsafe { (*self.instance).as_ref() }
    }

    /// Wrap into the shared handle type used by the registry.
    pub fn into_dyn(self) -> crate::DynExtension {
        std::sync::Arc::new(tokio::sync::RwLock::new(Box::new(self) as Box<dyn Extension>))
    }
}

#[async_trait::async_trait]
impl Extension for LoadedExtension {
    fn metadata(&self) -> &ExtensionMetadata {
        &self.metadata
    }

    fn commands(&self) -> &[CommandDefinition] {
        self.inner().commands()
    }

    async fn execute_command(&self, command: &str, args: &Value) -> Result<Value> {
        self.inner().execute_command(command, args).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner().health_check().await
    }
}

impl Drop for LoadedExtension {
    fn drop(&mut self) {
        unsafe { (self.destroy_fn)(self.instance as *mut ()) };
    }
}
