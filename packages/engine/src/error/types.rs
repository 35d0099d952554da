use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigurationError;

/// A Result alias where the Err case is `entscan_engine::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while streaming, querying or inferring over an entity file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed JSON. Streams never recover from this.
    #[error("malformed JSON in {} at byte {offset}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        offset: u64,
        message: String,
    },

    #[error("invalid path expression '{expression}': {reason}")]
    InvalidPath { expression: String, reason: String },

    /// Only raised when strict filter parsing is enabled.
    #[error("invalid filter expression '{0}'")]
    InvalidFilter(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Config(#[from] ConfigurationError),

    /// Join keys were not supplied and none could be detected.
    #[error(
        "no relationship detected between {} and {}; pass explicit left and right keys",
        .left.display(),
        .right.display()
    )]
    NoRelationship { left: PathBuf, right: PathBuf },

    #[error("type lookup failed: {0}")]
    Lookup(String),

    #[error("type lookup timed out after {0:?}")]
    LookupTimeout(Duration),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File missing or unreadable
    Io,
    /// Malformed JSON
    Parse,
    /// Bad caller input (paths, filters, arguments, configuration)
    InvalidInput,
    /// A required relationship could not be found
    NotFound,
    /// The external type-lookup process failed
    Lookup,
}
