//! Shared test helpers: a recording linker backend and a test class loader.

#![allow(dead_code)]

use nsloader_core::{
    ClassLoader, LibraryNamespaces, LinkerError, LoaderConfig, NamespaceBackend, NamespaceRequest,
    NativeBridge, NativeLinker, RawNamespace,
};
use nsloader_libraries::{LibrarySet, PublicLibraries};
use std::collections::HashMap;
use std::sync::Arc;

// ── Class loaders ────────────────────────────────────────────────

#[derive(Debug)]
pub struct TestLoader {
    pub name: &'static str,
    parent: Option<Arc<TestLoader>>,
}

impl ClassLoader for TestLoader {
    fn parent(&self) -> Option<Arc<Self>> {
        self.parent.clone()
    }
}

pub fn boot_loader(name: &'static str) -> Arc<TestLoader> {
    Arc::new(TestLoader { name, parent: None })
}

pub fn child_loader(name: &'static str, parent: &Arc<TestLoader>) -> Arc<TestLoader> {
    Arc::new(TestLoader {
        name,
        parent: Some(Arc::clone(parent)),
    })
}

// ── Recording backend ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedNamespace {
    pub raw: RawNamespace,
    pub name: String,
    pub search_path: String,
    pub permitted_path: String,
    pub parent: Option<RawNamespace>,
    pub is_shared: bool,
    pub is_greylist_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCall {
    pub from: RawNamespace,
    pub to: Option<RawNamespace>,
    pub shared_libraries: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousInit {
    pub public_libraries: String,
    pub search_path: Option<String>,
}

/// Records every call. Used both as the native linker and as the bridge.
#[derive(Debug, Default)]
pub struct FakeBackend {
    next_id: u64,
    exported: HashMap<String, RawNamespace>,
    pub created: Vec<CreatedNamespace>,
    pub links: Vec<LinkCall>,
    pub preloaded: Vec<String>,
    pub anonymous_inits: Vec<AnonymousInit>,

    pub fail_create: Option<String>,
    /// Fails links whose target is this exported namespace.
    pub fail_link_to: Option<String>,
    pub fail_preload: Option<String>,
    pub fail_anonymous_init: Option<String>,

    // Bridge-only behaviour.
    pub bridge_initialized: bool,
    pub bridge_path_prefix: Option<String>,
}

impl FakeBackend {
    /// A native linker with no exported namespaces.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Namespace ids start at `base`, so native and bridged ids never collide.
    pub fn with_id_base(base: u64) -> Self {
        Self {
            next_id: base,
            ..Default::default()
        }
    }

    /// A linker exporting `system`, `runtime`, `vndk` and `sphal`.
    pub fn device() -> Self {
        Self::new()
            .export("system")
            .export("runtime")
            .export("vndk")
            .export("sphal")
    }

    pub fn export(mut self, name: &str) -> Self {
        let raw = self.allocate();
        self.exported.insert(name.to_string(), raw);
        self
    }

    pub fn exported(&self, name: &str) -> RawNamespace {
        self.exported[name]
    }

    /// A bridge that claims every path starting with `prefix`.
    pub fn bridge_for(prefix: &str) -> Self {
        Self {
            bridge_initialized: true,
            bridge_path_prefix: Some(prefix.to_string()),
            ..Self::with_id_base(10_000)
        }
    }

    pub fn failing_create(mut self, reason: &str) -> Self {
        self.fail_create = Some(reason.to_string());
        self
    }

    pub fn failing_link_to(mut self, target: &str) -> Self {
        self.fail_link_to = Some(target.to_string());
        self
    }

    pub fn failing_preload(mut self, soname: &str) -> Self {
        self.fail_preload = Some(soname.to_string());
        self
    }

    pub fn failing_anonymous_init(mut self, reason: &str) -> Self {
        self.fail_anonymous_init = Some(reason.to_string());
        self
    }

    /// A bridge that is present but not yet initialized.
    pub fn uninitialized(mut self) -> Self {
        self.bridge_initialized = false;
        self
    }

    pub fn links_from(&self, from: RawNamespace) -> Vec<&LinkCall> {
        self.links.iter().filter(|l| l.from == from).collect()
    }

    pub fn link_to(&self, from: RawNamespace, to: Option<RawNamespace>) -> Option<&LinkCall> {
        self.links.iter().find(|l| l.from == from && l.to == to)
    }

    fn allocate(&mut self) -> RawNamespace {
        let raw = RawNamespace::new(self.next_id);
        self.next_id += 1;
        raw
    }
}

impl NamespaceBackend for FakeBackend {
    fn create_namespace(
        &mut self,
        request: &NamespaceRequest<'_>,
    ) -> Result<RawNamespace, LinkerError> {
        if let Some(reason) = &self.fail_create {
            return Err(LinkerError::new(reason.clone()));
        }
        let raw = self.allocate();
        self.created.push(CreatedNamespace {
            raw,
            name: request.name.to_string(),
            search_path: request.search_path(),
            permitted_path: request.permitted_path(),
            parent: request.parent,
            is_shared: request.is_shared,
            is_greylist_enabled: request.is_greylist_enabled,
        });
        Ok(raw)
    }

    fn link_namespaces(
        &mut self,
        from: RawNamespace,
        to: Option<RawNamespace>,
        shared_libraries: &LibrarySet,
    ) -> Result<(), LinkerError> {
        if let Some(target) = &self.fail_link_to {
            if self.exported.get(target).copied() == to {
                return Err(LinkerError::new(format!("cannot link to {target}")));
            }
        }
        self.links.push(LinkCall {
            from,
            to,
            shared_libraries: shared_libraries.to_string(),
        });
        Ok(())
    }

    fn exported_namespace(&self, name: &str) -> Option<RawNamespace> {
        self.exported.get(name).copied()
    }

    fn init_anonymous_namespace(
        &mut self,
        public_libraries: &LibrarySet,
        search_path: Option<&str>,
    ) -> Result<(), LinkerError> {
        if let Some(reason) = &self.fail_anonymous_init {
            return Err(LinkerError::new(reason.clone()));
        }
        self.anonymous_inits.push(AnonymousInit {
            public_libraries: public_libraries.to_string(),
            search_path: search_path.map(str::to_string),
        });
        Ok(())
    }
}

impl NativeLinker for FakeBackend {
    fn preload(&mut self, soname: &str) -> Result<(), LinkerError> {
        if self.fail_preload.as_deref() == Some(soname) {
            return Err(LinkerError::new(format!("library \"{soname}\" not found")));
        }
        self.preloaded.push(soname.to_string());
        Ok(())
    }
}

impl NativeBridge for FakeBackend {
    fn is_initialized(&self) -> bool {
        self.bridge_initialized
    }

    fn is_path_supported(&self, path: &str) -> bool {
        self.bridge_initialized
            && self
                .bridge_path_prefix
                .as_deref()
                .is_some_and(|prefix| path.starts_with(prefix))
    }
}

// ── Fixtures ────────────────────────────────────────────────────

pub const DEFAULT_PUBLIC: &str = "libc.so:libm.so:libdl.so:liblog.so";
pub const EXTENDED_PUBLIC: &str = "libfoo.acme.so";
pub const LLNDK: &str = "libvndksupport.so:libsync.so";
pub const VNDKSP: &str = "libbase.so:libcutils.so";
pub const VENDOR_PUBLIC: &str = "libvendorfoo.so";
pub const RUNTIME_PUBLIC: &str = "libicuuc.so:libicui18n.so";

pub fn test_libraries() -> PublicLibraries {
    PublicLibraries::default()
        .with_default(LibrarySet::parse(DEFAULT_PUBLIC))
        .with_extended(LibrarySet::parse(EXTENDED_PUBLIC))
        .with_runtime(LibrarySet::parse(RUNTIME_PUBLIC))
        .with_vendor(LibrarySet::parse(VENDOR_PUBLIC))
        .with_vndksp(LibrarySet::parse(VNDKSP))
        .with_llndk(LibrarySet::parse(LLNDK))
}

pub fn test_config() -> LoaderConfig {
    LoaderConfig {
        lib_dir: "lib64".to_string(),
        ..Default::default()
    }
}

pub type TestNamespaces = LibraryNamespaces<TestLoader, FakeBackend, FakeBackend>;

/// Engine over a device-like linker and an uninitialized bridge.
pub fn device_namespaces() -> TestNamespaces {
    namespaces_with(FakeBackend::device(), FakeBackend::with_id_base(10_000))
}

pub fn namespaces_with(linker: FakeBackend, bridge: FakeBackend) -> TestNamespaces {
    LibraryNamespaces::with_bridge(linker, bridge, test_libraries(), test_config())
}

/// Engine over a device-like linker with custom library sets.
pub fn device_namespaces_over(libraries: PublicLibraries) -> TestNamespaces {
    LibraryNamespaces::with_bridge(
        FakeBackend::device(),
        FakeBackend::with_id_base(10_000),
        libraries,
        test_config(),
    )
}

/// Installs a `tracing` subscriber honouring `RUST_LOG`; safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
