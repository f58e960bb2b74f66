//! Extension Loader
//!
//! Loads extension manifests from the filesystem and validates them. An
//! extension directory holds a `manifest.json`:
//!
//! ```json
//! {
//!   "publisherType": "User",
//!   "publisherName": "acme",
//!   "name": "depth",
//!   "version": "1.0.0",
//!   "shortDescription": "Market depth",
//!   "strings": ["Show depth", "Hide depth"],
//!   "commands": [{ "name": "show", "defaultDisplayIndex": 0 }]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use deskext_core::ExtensionInfo;

use crate::api::{CommandApi, ExtensionInfoApi};
use crate::error::{SDKError, SDKResult};
use crate::registry::StringTable;
use crate::utils::{validate_extension_name, validate_publisher_name, validate_version};

/// Name of the manifest file inside an extension directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// On-disk manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    #[serde(flatten)]
    pub info: ExtensionInfoApi,
    #[serde(default)]
    pub strings: Vec<String>,
    #[serde(default)]
    pub commands: Vec<CommandApi>,
}

/// A validated manifest, ready for the host to load.
#[derive(Debug, Clone)]
pub struct ExtensionBundle {
    pub dir: PathBuf,
    pub info: ExtensionInfo,
    pub strings: StringTable,
    /// Commands the extension registers when it activates.
    pub commands: Vec<CommandApi>,
}

/// Extension loader configuration
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Extension directories to scan
    pub directories: Vec<PathBuf>,
}

/// Extension loader
#[derive(Debug, Clone, Default)]
pub struct ExtensionLoader {
    config: LoaderConfig,
}

impl ExtensionLoader {
    /// Create a new extension loader
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load an extension from a directory
    pub async fn load_from_dir(&self, path: &Path) -> SDKResult<ExtensionBundle> {
        let manifest_path = path.join(MANIFEST_FILE);

        if !fs::try_exists(&manifest_path).await.unwrap_or(false) {
            return Err(SDKError::not_found(
                "manifest",
                manifest_path.display().to_string(),
            ));
        }

        let content = fs::read_to_string(&manifest_path).await?;
        let manifest: ExtensionManifest = serde_json::from_str(&content)
            .map_err(|e| SDKError::manifest(&manifest_path, format!("invalid JSON: {e}")))?;

        let bundle = self.validate_manifest(&manifest_path, manifest)?;
        debug!(
            extension = %bundle.info.label(),
            strings = bundle.strings.len(),
            commands = bundle.commands.len(),
            "manifest loaded"
        );
        Ok(ExtensionBundle {
            dir: path.to_path_buf(),
            ..bundle
        })
    }

    /// Scan configured directories for extensions
    pub async fn scan(&self) -> Vec<SDKResult<ExtensionBundle>> {
        let mut results = Vec::new();

        for dir in &self.config.directories {
            let mut entries = match fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping extension directory");
                    continue;
                }
            };

            let mut found = Vec::new();
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                if fs::try_exists(path.join(MANIFEST_FILE))
                    .await
                    .unwrap_or(false)
                {
                    found.push(path);
                }
            }
            // Directory order is platform dependent
            found.sort();

            for path in found {
                results.push(self.load_from_dir(&path).await);
            }
        }

        results
    }

    /// Validate a manifest and translate its identity
    fn validate_manifest(
        &self,
        manifest_path: &Path,
        manifest: ExtensionManifest,
    ) -> SDKResult<ExtensionBundle> {
        validate_extension_name(&manifest.info.name)
            .map_err(|e| SDKError::invalid_field(manifest_path, e))?;
        validate_publisher_name(&manifest.info.publisher_name)
            .map_err(|e| SDKError::invalid_field(manifest_path, e))?;
        validate_version(&manifest.info.version)
            .map_err(|e| SDKError::invalid_field(manifest_path, e))?;

        let info = manifest
            .info
            .to_info()
            .map_err(|e| SDKError::manifest(manifest_path, e.to_string()))?;

        Ok(ExtensionBundle {
            dir: PathBuf::new(),
            info,
            strings: StringTable::new(manifest.strings),
            commands: manifest.commands,
        })
    }
}
