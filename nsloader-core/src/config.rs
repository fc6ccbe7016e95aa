//! Loader configuration. Reads an optional `nsloader.toml` overriding the
//! built-in partition layout, SDK thresholds, and namespace names.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Apps may `System.load()` absolute paths under these directories even when
/// they lie outside the class loader's search path.
pub const WHITELISTED_DIRECTORIES: &[&str] = &["/data", "/mnt/expand"];

/// Apps targeting an SDK below this get the greylist workaround.
pub const GREYLIST_SDK_THRESHOLD: u32 = 24;

/// Product apps are unbundled only when targeting an SDK above this.
pub const UNBUNDLED_PRODUCT_SDK_THRESHOLD: u32 = 29;

/// Names of the namespaces the engine creates or links against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NamespaceNames {
    /// Name given to ordinary app namespaces.
    pub classloader: String,
    /// Name given to unbundled vendor/product app namespaces.
    pub vendor_classloader: String,
    /// Exported namespace holding vendor public libraries. Historically
    /// called `sphal`.
    pub vendor: String,
    pub vndk: String,
    pub runtime: String,
}

impl Default for NamespaceNames {
    fn default() -> Self {
        Self {
            classloader: "classloader-namespace".to_string(),
            vendor_classloader: "vendor-classloader-namespace".to_string(),
            vendor: "sphal".to_string(),
            vndk: "vndk".to_string(),
            runtime: "runtime".to_string(),
        }
    }
}

/// Static inputs to namespace policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoaderConfig {
    pub whitelisted_directories: Vec<String>,
    /// `lib64` or `lib`, appended to partition roots.
    pub lib_dir: String,
    pub greylist_sdk_threshold: u32,
    pub unbundled_product_sdk_threshold: u32,
    pub namespaces: NamespaceNames,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            whitelisted_directories: WHITELISTED_DIRECTORIES
                .iter()
                .map(|d| d.to_string())
                .collect(),
            lib_dir: default_lib_dir().to_string(),
            greylist_sdk_threshold: GREYLIST_SDK_THRESHOLD,
            unbundled_product_sdk_threshold: UNBUNDLED_PRODUCT_SDK_THRESHOLD,
            namespaces: NamespaceNames::default(),
        }
    }
}

fn default_lib_dir() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "lib64"
    } else {
        "lib"
    }
}

impl LoaderConfig {
    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Loads configuration from an explicit path.
    /// Falls back to defaults with a warning when the file is missing or invalid.
    pub fn load_from(path: PathBuf) -> Self {
        if !path.exists() {
            info!("No loader config found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded loader config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse loader config {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read loader config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Library directories of a partition, e.g. `/vendor/lib64`.
    pub fn partition_lib_paths(&self, partition_roots: &[&str]) -> Vec<String> {
        partition_roots
            .iter()
            .map(|root| format!("{}/{}", root, self.lib_dir))
            .collect()
    }
}
