//! Error types for library set configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading public library configuration.
#[derive(Debug, Error)]
pub enum LibraryConfigError {
    /// A configuration file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file that must exist is missing.
    #[error("required library config not found: {}", .0.display())]
    MissingConfig(PathBuf),

    /// A line could not be parsed.
    #[error("{source_name}:{line}: {reason}")]
    InvalidLine {
        source_name: String,
        line: usize,
        reason: String,
    },

    /// An extended public library is not namespaced by its company.
    #[error("library '{soname}' in {source_name} must end with '.{company}.so'")]
    InvalidCompanyLibrary {
        source_name: String,
        soname: String,
        company: String,
    },

    /// TOML parse error.
    #[error("invalid library config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for library configuration.
pub type LibraryResult<T> = Result<T, LibraryConfigError>;
