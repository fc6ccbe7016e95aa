//! One-time, process-wide namespace setup.

use crate::backend::{NativeBridge, NativeLinker};
use crate::error::{FatalError, NamespaceError, NamespaceResult};
use crate::handle::Linkers;
use nsloader_libraries::LibrarySet;
use tracing::{debug, info};

/// Bootstrap progress for one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bootstrap {
    preloaded: bool,
    anonymous_initialized: bool,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the anonymous namespace has been set up.
    pub fn is_initialized(&self) -> bool {
        self.anonymous_initialized
    }

    pub fn is_preloaded(&self) -> bool {
        self.preloaded
    }

    /// Preloads the default public libraries so the anonymous namespace can
    /// later resolve them by soname alone.
    ///
    /// Runs at most once, and not at all once the anonymous namespace exists.
    /// Any failure is fatal.
    pub fn preload_defaults<L: NativeLinker>(
        &mut self,
        linker: &mut L,
        default_public: &LibrarySet,
    ) -> Result<(), FatalError> {
        if self.preloaded || self.anonymous_initialized {
            return Ok(());
        }

        for soname in default_public.iter() {
            linker
                .preload(soname)
                .map_err(|e| FatalError::PreloadFailed {
                    soname: soname.to_string(),
                    reason: e.message().to_string(),
                })?;
            debug!(soname, "Preloaded public library");
        }

        self.preloaded = true;
        info!(count = default_public.len(), "Preloaded default public libraries");
        Ok(())
    }

    /// Initializes the anonymous namespace with `search_path` as its lookup
    /// root.
    ///
    /// The native linker gets the search path unless the bridge claims it. An
    /// initialized bridge gets its own anonymous namespace as well, with the
    /// search path only when it claims it. On failure the flag stays clear so
    /// a later call can retry.
    pub fn init_anonymous_namespace<L: NativeLinker, B: NativeBridge>(
        &mut self,
        linkers: &mut Linkers<L, B>,
        default_public: &LibrarySet,
        search_path: &str,
    ) -> NamespaceResult<()> {
        let is_bridged = linkers.bridge().is_path_supported(search_path);

        linkers
            .native_mut()
            .init_anonymous_namespace(default_public, (!is_bridged).then_some(search_path))
            .map_err(NamespaceError::AnonymousNamespace)?;

        if linkers.bridge().is_initialized() {
            linkers
                .bridge_mut()
                .init_anonymous_namespace(default_public, is_bridged.then_some(search_path))
                .map_err(NamespaceError::AnonymousNamespace)?;
        }

        self.anonymous_initialized = true;
        info!(search_path, is_bridged, "Initialized anonymous namespace");
        Ok(())
    }
}
