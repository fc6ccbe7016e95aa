//! Linker namespace policy for class loaders.
//!
//! Native libraries on the device are partitioned by trust domain: platform,
//! vendor, product and runtime. Every class loader gets its own linker
//! namespace, and that namespace may only see libraries of other domains
//! through explicit, one-directional links that expose a named list of
//! sonames. This crate decides what each namespace looks like:
//!
//! 1. **Origin**: classify the class loader's dex path as default, vendor or
//!    product ([`classify`])
//! 2. **Policy**: derive search paths, permitted paths and exposed library
//!    sets ([`EffectivePolicy`])
//! 3. **Create**: create the namespace under the nearest registered ancestor,
//!    in the native linker or the native bridge
//! 4. **Link**: platform → runtime → VNDK → vendor
//! 5. **Register**: remember the namespace for the class loader without
//!    keeping the class loader alive
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use nsloader_core::*;
//! # fn demo<C: ClassLoader, L: NativeLinker>(linker: L, app_loader: Arc<C>) -> NamespaceResult<()> {
//! let libraries = nsloader_libraries::PublicLibraries::from_partition_root("/".as_ref())
//!     .expect("public library config");
//! let namespaces = SharedNamespaces::new(LibraryNamespaces::new(
//!     linker,
//!     libraries,
//!     LoaderConfig::default(),
//! ));
//! namespaces.initialize()?;
//!
//! let handle = namespaces.create(
//!     &app_loader,
//!     &CreateParams {
//!         target_sdk_version: 34,
//!         dex_path: Some("/data/app/com.example/base.apk"),
//!         library_path: Some("/data/app/com.example/lib/arm64"),
//!         ..Default::default()
//!     },
//! )?;
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```
//!
//! The linker itself is not part of this crate; hosts implement
//! [`NativeLinker`] (and [`NativeBridge`] when a bridge is present).

mod backend;
mod bootstrap;
mod config;
mod error;
mod handle;
mod namespaces;
mod origin;
mod policy;
mod registry;

pub use backend::{
    LoaderKind, NamespaceBackend, NamespaceRequest, NativeBridge, NativeLinker, NoBridge,
    RawNamespace, DEFAULT_NAMESPACE_NAME, PLATFORM_NAMESPACE_NAME,
};
pub use bootstrap::Bootstrap;
pub use config::{
    LoaderConfig, NamespaceNames, GREYLIST_SDK_THRESHOLD, UNBUNDLED_PRODUCT_SDK_THRESHOLD,
    WHITELISTED_DIRECTORIES,
};
pub use error::{FatalError, LinkerError, NamespaceError, NamespaceResult};
pub use handle::{Linkers, NamespaceHandle};
pub use namespaces::{LibraryNamespaces, SharedNamespaces};
pub use origin::{classify, OriginClass};
pub use policy::{CreateParams, EffectivePolicy};
pub use registry::{ClassLoader, NamespaceRegistry};
