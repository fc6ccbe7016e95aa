//! Public library sets for nsloader linker namespaces.
//!
//! Every class-loader namespace is linked to a handful of shared namespaces,
//! and each link exposes only a named list of sonames. This crate owns those
//! lists:
//! - [`LibrarySet`]: an ordered, de-duplicated list of sonames
//! - [`PublicLibraries`]: the six sets a process works with (default,
//!   extended, runtime, vendor, VNDK-SP, LLNDK)
//! - Parsing of `public.libraries.txt`-style configuration files
//!
//! Sets are loaded once per process and treated as immutable afterwards.

mod error;
mod public;
mod set;

pub use error::{LibraryConfigError, LibraryResult};
pub use public::{
    parse_config, PublicLibraries, DEFAULT_RUNTIME_PUBLIC_LIBRARIES, EXTENDED_CONFIG_PREFIX,
};
pub use set::LibrarySet;
