//! Extension registry for managing loaded extensions.
//!
//! The registry provides registration and lookup, command dispatch, health
//! checks, and filesystem discovery of extension libraries.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use greet_extension_sdk::{Extension, ExtensionError, ExtensionMetadata, Result};
use tokio::sync::RwLock;

use crate::loader::NativeExtensionLoader;
use crate::DynExtension;

/// Information about a registered extension.
#[derive(Debug, Clone)]
pub struct ExtensionInfo {
    /// Extension metadata
    pub metadata: ExtensionMetadata,
    /// When the extension was registered
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Registry for managing extensions.
pub struct ExtensionRegistry {
    /// Registered extensions by id
    extensions: RwLock<HashMap<String, DynExtension>>,
    /// Extension information cache
    info_cache: RwLock<HashMap<String, ExtensionInfo>>,
    /// Native extension loader
    loader: NativeExtensionLoader,
    /// Extension directories to scan
    extension_dirs: Vec<PathBuf>,
}

impl ExtensionRegistry {
    /// Create a new extension registry.
    pub fn new() -> Self {
        Self {
            extensions: RwLock::new(HashMap::new()),
            info_cache: RwLock::new(HashMap::new()),
            loader: NativeExtensionLoader::new(),
            extension_dirs: Vec::new(),
        }
    }

    /// Create a registry with a preconfigured loader.
    pub fn with_loader(loader: NativeExtensionLoader) -> Self {
        Self {
            extensions: RwLock::new(HashMap::new()),
            info_cache: RwLock::new(HashMap::new()),
            loader,
            extension_dirs: Vec::new(),
        }
    }

    /// Add an extension directory to scan during discovery.
    pub fn add_extension_dir(&mut self, path: PathBuf) {
        self.extension_dirs.push(path);
    }

    /// Register an extension. Fails if the id is already registered.
    pub async fn register(&self, extension: DynExtension) -> Result<()> {
        let metadata = extension.read().await.metadata().clone();
        let id = metadata.id.clone();

        // The duplicate check and the insert happen under one write lock.
        {
            let mut extensions = self.extensions.write().await;
            match extensions.entry(id.clone()) {
                Entry::Occupied(_) => return Err(ExtensionError::AlreadyRegistered(id)),
                Entry::Vacant(entry) => {
                    entry.insert(extension);
                }
            }
        }

        self.info_cache.write().await.insert(
            id.clone(),
            ExtensionInfo {
                metadata,
                loaded_at: chrono::Utc::now(),
            },
        );

        tracing::info!(id = %id, "registered extension");
        Ok(())
    }

    /// Unregister an extension.
    pub async fn unregister(&self, id: &str) -> Result<()> {
        self.extensions.write().await.remove(id);
        self.info_cache.write().await.remove(id);
        Ok(())
    }

    /// Get an extension by ID.
    pub async fn get(&self, id: &str) -> Option<DynExtension> {
        self.extensions.read().await.get(id).cloned()
    }

    /// Get extension info by ID.
    pub async fn get_info(&self, id: &str) -> Option<ExtensionInfo> {
        self.info_cache.read().await.get(id).cloned()
    }

    /// List all registered extensions.
    pub async fn list(&self) -> Vec<ExtensionInfo> {
        self.info_cache.read().await.values().cloned().collect()
    }

    /// Execute a command on an extension.
    pub async fn execute_command(
        &self,
        id: &str,
        command: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let ext = self
            .get(id)
            .await
            .ok_or_else(|| ExtensionError::NotFound(id.to_string()))?;

        let ext = ext.read().await;
        ext.execute_command(command, args).await
    }

    /// Perform a health check on an extension.
    pub async fn health_check(&self, id: &str) -> Result<bool> {
        let ext = self
            .get(id)
            .await
            .ok_or_else(|| ExtensionError::NotFound(id.to_string()))?;

        let ext = ext.read().await;
        ext.health_check().await
    }

    /// Load a native extension from a file path and register it.
    pub async fn load_from_path(&self, path: &Path) -> Result<ExtensionMetadata> {
        let loaded = self.loader.load(path)?;
        let metadata = loaded.metadata().clone();
        self.register(loaded.into_dyn()).await?;
        Ok(metadata)
    }

    /// Discover extensions in the configured directories.
    ///
    /// Reads descriptors without instantiating anything; libraries that
    /// fail to yield a valid descriptor are skipped with a warning.
    pub async fn discover(&self) -> Vec<ExtensionMetadata> {
        let mut discovered = Vec::new();

        for dir in &self.extension_dirs {
            for path in self.loader.discover(dir) {
                match self.loader.load_metadata(&path) {
                    Ok(metadata) => discovered.push(metadata),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "skipping extension: {e}");
                    }
                }
            }
        }

        discovered
    }

    /// Get the number of registered extensions.
    pub async fn count(&self) -> usize {
        self.extensions.read().await.len()
    }

    /// Check if an extension is registered.
    pub async fn contains(&self, id: &str) -> bool {
        self.extensions.read().await.contains_key(id)
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
