//! Class-loader namespace engine.
//!
//! Owns the registry, the bootstrap state, and both linker backends.
//! [`LibraryNamespaces`] is single-threaded (`&mut self`); the host wraps it
//! in [`SharedNamespaces`] so that every call for the process runs inside one
//! critical section.

use crate::backend::{
    NamespaceRequest, NativeBridge, NativeLinker, NoBridge, RawNamespace, PLATFORM_NAMESPACE_NAME,
};
use crate::bootstrap::Bootstrap;
use crate::config::LoaderConfig;
use crate::error::{FatalError, NamespaceError, NamespaceResult};
use crate::handle::{Linkers, NamespaceHandle};
use crate::origin;
use crate::policy::{CreateParams, EffectivePolicy};
use crate::registry::{ClassLoader, NamespaceRegistry};
use nsloader_libraries::{LibrarySet, PublicLibraries};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Namespace policy state for one process.
#[derive(Debug)]
pub struct LibraryNamespaces<C, L, B = NoBridge> {
    linkers: Linkers<L, B>,
    libraries: PublicLibraries,
    config: LoaderConfig,
    registry: NamespaceRegistry<C>,
    bootstrap: Bootstrap,
}

impl<C: ClassLoader, L: NativeLinker> LibraryNamespaces<C, L, NoBridge> {
    /// Creates an engine for a process without a native bridge.
    pub fn new(linker: L, libraries: PublicLibraries, config: LoaderConfig) -> Self {
        Self::with_bridge(linker, NoBridge, libraries, config)
    }
}

impl<C: ClassLoader, L: NativeLinker, B: NativeBridge> LibraryNamespaces<C, L, B> {
    pub fn with_bridge(
        linker: L,
        bridge: B,
        libraries: PublicLibraries,
        config: LoaderConfig,
    ) -> Self {
        Self {
            linkers: Linkers::new(linker, bridge),
            libraries,
            config,
            registry: NamespaceRegistry::new(),
            bootstrap: Bootstrap::new(),
        }
    }

    /// Preloads the default public libraries. Call once at startup, before
    /// the first [`Self::create`]; later calls do nothing.
    pub fn initialize(&mut self) -> NamespaceResult<()> {
        self.bootstrap
            .preload_defaults(self.linkers.native_mut(), self.libraries.default_public())?;
        Ok(())
    }

    /// Creates, links and registers the namespace for `class_loader`.
    ///
    /// Calling this twice for the same class loader is a
    /// [`FatalError::DuplicateClassLoader`]; use [`Self::find`] first.
    /// On any error nothing is registered.
    pub fn create(
        &mut self,
        class_loader: &Arc<C>,
        params: &CreateParams<'_>,
    ) -> NamespaceResult<NamespaceHandle> {
        if self.registry.find(class_loader).is_some() {
            return Err(FatalError::DuplicateClassLoader.into());
        }

        // The first non-empty library path seeds the anonymous namespace.
        let library_path = params.library_path.unwrap_or_default();
        if !library_path.is_empty() && !self.bootstrap.is_initialized() {
            self.bootstrap.init_anonymous_namespace(
                &mut self.linkers,
                self.libraries.default_public(),
                library_path,
            )?;
        }

        let origin = origin::classify(params.dex_path)?;
        let policy = EffectivePolicy::compute(origin, params, &self.libraries, &self.config);

        let parent = self.registry.find_parent(class_loader).cloned();
        let request = NamespaceRequest {
            name: &policy.namespace_name,
            search_paths: &policy.search_paths,
            permitted_paths: &policy.permitted_paths,
            parent: None,
            is_shared: policy.is_shared,
            is_greylist_enabled: policy.is_greylist_enabled,
        };
        let namespace = self
            .linkers
            .create_namespace(&request, parent.as_ref())
            .map_err(|source| NamespaceError::CreateNamespace {
                name: policy.namespace_name.clone(),
                source,
            })?;

        self.link_shared_namespaces(&namespace, &policy)?;

        info!(
            namespace = namespace.name(),
            origin = %policy.origin,
            bridged = namespace.is_bridged(),
            library_path = %policy.search_path(),
            "Created class loader namespace"
        );
        Ok(self.registry.insert(class_loader, namespace).clone())
    }

    /// Links a fresh namespace to the platform, runtime, VNDK and vendor
    /// namespaces, in that order.
    fn link_shared_namespaces(
        &mut self,
        namespace: &NamespaceHandle,
        policy: &EffectivePolicy,
    ) -> NamespaceResult<()> {
        let kind = namespace.kind();
        let names = self.config.namespaces.clone();

        let platform = self.linkers.platform_namespace(kind);
        self.link(namespace, PLATFORM_NAMESPACE_NAME, platform, &policy.platform_exposed)?;

        // The runtime namespace is missing on host builds.
        if let Some(runtime) = self.linkers.exported_namespace(kind, &names.runtime) {
            self.link(namespace, &names.runtime, Some(runtime), &policy.runtime_exposed)?;
        } else {
            debug!(namespace = namespace.name(), "No runtime namespace to link");
        }

        if policy.is_unbundled && !policy.vndksp_exposed.is_empty() {
            if let Some(vndk) = self.linkers.exported_namespace(kind, &names.vndk) {
                self.link(namespace, &names.vndk, Some(vndk), &policy.vndksp_exposed)?;
            }
        }

        // Without a vendor namespace the target is `None`, which the linker
        // resolves through the default namespace.
        if !policy.vendor_exposed.is_empty() {
            let vendor = self.linkers.exported_namespace(kind, &names.vendor);
            self.link(namespace, &names.vendor, vendor, &policy.vendor_exposed)?;
        }

        Ok(())
    }

    fn link(
        &mut self,
        namespace: &NamespaceHandle,
        target_name: &str,
        target: Option<RawNamespace>,
        shared_libraries: &LibrarySet,
    ) -> NamespaceResult<()> {
        self.linkers
            .link(namespace, target, shared_libraries)
            .map_err(|source| NamespaceError::LinkNamespace {
                from: namespace.name().to_string(),
                target: target_name.to_string(),
                source,
            })
    }

    pub fn find(&self, class_loader: &Arc<C>) -> Option<&NamespaceHandle> {
        self.registry.find(class_loader)
    }

    pub fn find_parent(&self, class_loader: &Arc<C>) -> Option<&NamespaceHandle> {
        self.registry.find_parent(class_loader)
    }

    pub fn registry(&self) -> &NamespaceRegistry<C> {
        &self.registry
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn libraries(&self) -> &PublicLibraries {
        &self.libraries
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn linker(&self) -> &L {
        self.linkers.native()
    }

    pub fn bridge(&self) -> &B {
        self.linkers.bridge()
    }
}

/// [`LibraryNamespaces`] behind the process-wide class-loading lock.
#[derive(Debug)]
pub struct SharedNamespaces<C, L, B = NoBridge> {
    inner: Mutex<LibraryNamespaces<C, L, B>>,
}

impl<C: ClassLoader, L: NativeLinker, B: NativeBridge> SharedNamespaces<C, L, B> {
    pub fn new(namespaces: LibraryNamespaces<C, L, B>) -> Self {
        Self {
            inner: Mutex::new(namespaces),
        }
    }

    pub fn initialize(&self) -> NamespaceResult<()> {
        self.lock().initialize()
    }

    pub fn create(
        &self,
        class_loader: &Arc<C>,
        params: &CreateParams<'_>,
    ) -> NamespaceResult<NamespaceHandle> {
        self.lock().create(class_loader, params)
    }

    pub fn find(&self, class_loader: &Arc<C>) -> Option<NamespaceHandle> {
        self.lock().find(class_loader).cloned()
    }

    /// Returns the existing namespace for `class_loader`, creating it first
    /// if needed. Lookup and creation happen under one lock.
    pub fn find_or_create(
        &self,
        class_loader: &Arc<C>,
        params: &CreateParams<'_>,
    ) -> NamespaceResult<NamespaceHandle> {
        let mut namespaces = self.lock();
        if let Some(handle) = namespaces.find(class_loader) {
            return Ok(handle.clone());
        }
        namespaces.create(class_loader, params)
    }

    /// Runs `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut LibraryNamespaces<C, L, B>) -> R) -> R {
        f(&mut self.lock())
    }

    // Poisoning is ignored: registry entries are appended only after every
    // fallible step has succeeded.
    fn lock(&self) -> MutexGuard<'_, LibraryNamespaces<C, L, B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
