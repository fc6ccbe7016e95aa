//! Namespace handles and dispatch between the native and bridged backends.

use crate::backend::{
    LoaderKind, NamespaceBackend, NamespaceRequest, NativeBridge, NativeLinker, RawNamespace,
};
use crate::error::LinkerError;
use nsloader_libraries::LibrarySet;

/// A namespace created for a class loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceHandle {
    name: String,
    raw: RawNamespace,
    kind: LoaderKind,
}

impl NamespaceHandle {
    pub fn new(name: impl Into<String>, raw: RawNamespace, kind: LoaderKind) -> Self {
        Self {
            name: name.into(),
            raw,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> RawNamespace {
        self.raw
    }

    pub fn kind(&self) -> LoaderKind {
        self.kind
    }

    pub fn is_bridged(&self) -> bool {
        self.kind == LoaderKind::Bridged
    }
}

/// The native linker plus the (possibly absent) bridge.
///
/// Every call on an existing namespace is routed to the backend that created
/// it, so native and bridged namespaces never mix.
#[derive(Debug)]
pub struct Linkers<L, B> {
    native: L,
    bridge: B,
}

impl<L: NativeLinker, B: NativeBridge> Linkers<L, B> {
    pub fn new(native: L, bridge: B) -> Self {
        Self { native, bridge }
    }

    pub fn native(&self) -> &L {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut L {
        &mut self.native
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    fn backend(&self, kind: LoaderKind) -> &dyn NamespaceBackend {
        match kind {
            LoaderKind::Native => &self.native,
            LoaderKind::Bridged => &self.bridge,
        }
    }

    fn backend_mut(&mut self, kind: LoaderKind) -> &mut dyn NamespaceBackend {
        match kind {
            LoaderKind::Native => &mut self.native,
            LoaderKind::Bridged => &mut self.bridge,
        }
    }

    /// Picks the backend for a new namespace: a child inherits its parent's
    /// backend; a root namespace is bridged only when the bridge claims its
    /// search path.
    pub fn kind_for(&self, parent: Option<&NamespaceHandle>, search_path: &str) -> LoaderKind {
        match parent {
            Some(parent) => parent.kind(),
            None if !search_path.is_empty() && self.bridge.is_path_supported(search_path) => {
                LoaderKind::Bridged
            }
            None => LoaderKind::Native,
        }
    }

    /// Creates a namespace in the backend chosen by [`Self::kind_for`].
    /// `request.parent` is overwritten with `parent`'s raw namespace.
    pub fn create_namespace(
        &mut self,
        request: &NamespaceRequest<'_>,
        parent: Option<&NamespaceHandle>,
    ) -> Result<NamespaceHandle, LinkerError> {
        let kind = self.kind_for(parent, &request.search_path());
        let request = NamespaceRequest {
            parent: parent.map(NamespaceHandle::raw),
            ..request.clone()
        };
        let raw = self.backend_mut(kind).create_namespace(&request)?;
        Ok(NamespaceHandle::new(request.name, raw, kind))
    }

    pub fn link(
        &mut self,
        from: &NamespaceHandle,
        to: Option<RawNamespace>,
        shared_libraries: &LibrarySet,
    ) -> Result<(), LinkerError> {
        self.backend_mut(from.kind())
            .link_namespaces(from.raw(), to, shared_libraries)
    }

    pub fn platform_namespace(&self, kind: LoaderKind) -> Option<RawNamespace> {
        self.backend(kind).platform_namespace()
    }

    pub fn exported_namespace(&self, kind: LoaderKind, name: &str) -> Option<RawNamespace> {
        self.backend(kind).exported_namespace(name)
    }
}
