//! Error types for the namespace policy engine.

use thiserror::Error;

/// Result type for namespace operations.
pub type NamespaceResult<T> = Result<T, NamespaceError>;

/// Error text reported by a linker or bridge backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct LinkerError(String);

impl LinkerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Contract violations that no retry can fix.
///
/// The host is expected to abort when it sees one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("dex path contains both vendor and product partition: {dex_path}")]
    AmbiguousOrigin { dex_path: String },

    #[error("there is already a namespace associated with this class loader")]
    DuplicateClassLoader,

    #[error("error preloading public library {soname}: {reason}")]
    PreloadFailed { soname: String, reason: String },
}

/// Errors surfaced by [`LibraryNamespaces`](crate::LibraryNamespaces).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// Unrecoverable; see [`FatalError`].
    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),

    #[error("failed to initialize anonymous namespace: {0}")]
    AnonymousNamespace(#[source] LinkerError),

    #[error("failed to create namespace '{name}': {source}")]
    CreateNamespace { name: String, source: LinkerError },

    #[error("failed to link namespace '{from}' to '{target}': {source}")]
    LinkNamespace {
        from: String,
        target: String,
        source: LinkerError,
    },
}

impl NamespaceError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Returns the fatal cause, if any.
    pub fn as_fatal(&self) -> Option<&FatalError> {
        match self {
            Self::Fatal(fatal) => Some(fatal),
            _ => None,
        }
    }
}
