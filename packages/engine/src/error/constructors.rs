use std::path::Path;

use super::types::Error;

impl Error {
    /// Creates an I/O error carrying the file path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a JSON parse error at an absolute byte offset of `path`.
    pub fn parse(path: impl AsRef<Path>, offset: u64, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.as_ref().to_path_buf(),
            offset,
            message: message.into(),
        }
    }

    pub fn invalid_path(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn no_relationship(left: impl AsRef<Path>, right: impl AsRef<Path>) -> Self {
        Error::NoRelationship {
            left: left.as_ref().to_path_buf(),
            right: right.as_ref().to_path_buf(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Error::Lookup(message.into())
    }
}
