//! Linker namespace primitives consumed by the policy engine.
//!
//! Two backends sit behind the same [`NamespaceBackend`] surface: the
//! process's own dynamic linker ([`NativeLinker`]) and an optional native
//! bridge that loads libraries built for another ISA ([`NativeBridge`]). A
//! namespace belongs to exactly one of them for its whole lifetime.

use crate::error::LinkerError;
use nsloader_libraries::LibrarySet;

/// Exported name of the platform namespace.
pub const PLATFORM_NAMESPACE_NAME: &str = "system";

/// Fallback when the linker config does not export a platform namespace.
pub const DEFAULT_NAMESPACE_NAME: &str = "default";

/// Opaque token a backend hands out for a namespace it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawNamespace(u64);

impl RawNamespace {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// Which backend a namespace lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    #[default]
    Native,
    Bridged,
}

/// Arguments to [`NamespaceBackend::create_namespace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRequest<'a> {
    pub name: &'a str,
    /// Searched in order for bare sonames.
    pub search_paths: &'a [String],
    /// Prefixes that absolute-path loads may come from.
    pub permitted_paths: &'a [String],
    /// `None` roots the namespace at the backend's default namespace.
    pub parent: Option<RawNamespace>,
    pub is_shared: bool,
    pub is_greylist_enabled: bool,
}

impl NamespaceRequest<'_> {
    /// Colon-joined search path.
    pub fn search_path(&self) -> String {
        self.search_paths.join(":")
    }

    /// Colon-joined permitted path.
    pub fn permitted_path(&self) -> String {
        self.permitted_paths.join(":")
    }
}

/// Namespace operations shared by the native linker and the bridge.
pub trait NamespaceBackend {
    fn create_namespace(
        &mut self,
        request: &NamespaceRequest<'_>,
    ) -> Result<RawNamespace, LinkerError>;

    /// Exposes `shared_libraries` of `to` inside `from`.
    ///
    /// A `to` of `None` links against the backend's default namespace.
    fn link_namespaces(
        &mut self,
        from: RawNamespace,
        to: Option<RawNamespace>,
        shared_libraries: &LibrarySet,
    ) -> Result<(), LinkerError>;

    /// Looks up a namespace exported by the linker configuration.
    fn exported_namespace(&self, name: &str) -> Option<RawNamespace>;

    fn platform_namespace(&self) -> Option<RawNamespace> {
        self.exported_namespace(PLATFORM_NAMESPACE_NAME)
            .or_else(|| self.exported_namespace(DEFAULT_NAMESPACE_NAME))
    }

    /// Sets up the anonymous namespace used for `dlopen` calls from code the
    /// linker cannot attribute to a library.
    fn init_anonymous_namespace(
        &mut self,
        public_libraries: &LibrarySet,
        search_path: Option<&str>,
    ) -> Result<(), LinkerError>;
}

/// The process's own dynamic linker.
pub trait NativeLinker: NamespaceBackend {
    /// Loads `soname` into the default namespace and keeps it resident.
    fn preload(&mut self, soname: &str) -> Result<(), LinkerError>;
}

/// An alternate loader for libraries of a foreign ISA.
pub trait NativeBridge: NamespaceBackend {
    fn is_initialized(&self) -> bool;

    /// Whether the bridge claims libraries under `path`. Always `false` when
    /// the bridge is not initialized.
    fn is_path_supported(&self, path: &str) -> bool;
}

/// Bridge used by processes without a native bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBridge;

impl NamespaceBackend for NoBridge {
    fn create_namespace(
        &mut self,
        _request: &NamespaceRequest<'_>,
    ) -> Result<RawNamespace, LinkerError> {
        Err(LinkerError::new("native bridge is not initialized"))
    }

    fn link_namespaces(
        &mut self,
        _from: RawNamespace,
        _to: Option<RawNamespace>,
        _shared_libraries: &LibrarySet,
    ) -> Result<(), LinkerError> {
        Err(LinkerError::new("native bridge is not initialized"))
    }

    fn exported_namespace(&self, _name: &str) -> Option<RawNamespace> {
        None
    }

    fn init_anonymous_namespace(
        &mut self,
        _public_libraries: &LibrarySet,
        _search_path: Option<&str>,
    ) -> Result<(), LinkerError> {
        Err(LinkerError::new("native bridge is not initialized"))
    }
}

impl NativeBridge for NoBridge {
    fn is_initialized(&self) -> bool {
        false
    }

    fn is_path_supported(&self, _path: &str) -> bool {
        false
    }
}
