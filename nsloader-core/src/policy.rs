//! Per-class-loader namespace policy.
//!
//! [`EffectivePolicy::compute`] is pure: it decides search paths, permitted
//! paths and the library sets each link exposes, without touching the
//! linker. The engine then applies the result.

use crate::config::LoaderConfig;
use crate::origin::OriginClass;
use nsloader_libraries::{LibrarySet, PublicLibraries};
use tracing::debug;

/// Caller-supplied facts about the class loader being set up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateParams<'a> {
    pub target_sdk_version: u32,
    /// Shared (bundled system) class loaders never get partition privileges.
    pub is_shared: bool,
    /// Colon-joined APK paths; used only for origin classification.
    pub dex_path: Option<&'a str>,
    /// Colon-joined native library search path.
    pub library_path: Option<&'a str>,
    /// Extra absolute-load directories.
    pub permitted_path: Option<&'a str>,
}

/// Everything needed to create and link one class-loader namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePolicy {
    pub origin: OriginClass,
    pub namespace_name: String,
    pub search_paths: Vec<String>,
    pub permitted_paths: Vec<String>,
    /// Vendor or post-threshold product app that is not shared.
    pub is_unbundled: bool,
    pub is_shared: bool,
    pub is_greylist_enabled: bool,
    pub platform_exposed: LibrarySet,
    pub runtime_exposed: LibrarySet,
    /// Empty unless the app is unbundled.
    pub vndksp_exposed: LibrarySet,
    pub vendor_exposed: LibrarySet,
}

impl EffectivePolicy {
    pub fn compute(
        origin: OriginClass,
        params: &CreateParams<'_>,
        libraries: &PublicLibraries,
        config: &LoaderConfig,
    ) -> Self {
        let mut search_paths = split_path(params.library_path.unwrap_or_default());

        // Custom class loaders may System.load() absolute paths outside their
        // search path; the whitelisted directories allow that.
        let mut permitted_paths = config.whitelisted_directories.clone();
        permitted_paths.extend(split_path(params.permitted_path.unwrap_or_default()));

        let is_unbundled = !params.is_shared
            && match origin {
                OriginClass::Vendor => true,
                OriginClass::Product => {
                    params.target_sdk_version > config.unbundled_product_sdk_threshold
                }
                OriginClass::Default => false,
            };

        let namespace_name;
        let platform_exposed;
        let vndksp_exposed;

        if is_unbundled {
            let partition_paths = match origin {
                OriginClass::Vendor => config.partition_lib_paths(&["/vendor"]),
                _ => config.partition_lib_paths(&["/product", "/system/product"]),
            };
            search_paths.extend(partition_paths.iter().cloned());
            permitted_paths.extend(partition_paths);

            // LLNDK libraries are available to vendor code.
            platform_exposed = libraries.default_public().concat(libraries.llndk());
            vndksp_exposed = libraries.vndksp().clone();
            namespace_name = config.namespaces.vendor_classloader.clone();

            debug!(
                partition = origin.partition(),
                library_path = %search_paths.join(":"),
                "Class loader namespace configured for unbundled app"
            );
        } else {
            // Extended public libraries are withheld from vendor apps; exposing
            // them would let system libraries leak into vendor code.
            platform_exposed = libraries.default_public().concat(libraries.extended_public());
            vndksp_exposed = LibrarySet::new();
            namespace_name = config.namespaces.classloader.clone();
        }

        Self {
            origin,
            namespace_name,
            search_paths,
            permitted_paths,
            is_unbundled,
            is_shared: params.is_shared,
            is_greylist_enabled: params.target_sdk_version < config.greylist_sdk_threshold,
            platform_exposed,
            runtime_exposed: libraries.runtime_public().clone(),
            vndksp_exposed,
            vendor_exposed: libraries.vendor_public().clone(),
        }
    }

    pub fn search_path(&self) -> String {
        self.search_paths.join(":")
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split(':')
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
