use super::types::{Error, ErrorKind};

impl Error {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::InvalidPath { .. }
            | Error::InvalidFilter(_)
            | Error::InvalidArgument(_)
            | Error::Config(_) => ErrorKind::InvalidInput,
            Error::NoRelationship { .. } => ErrorKind::NotFound,
            Error::Lookup(_) | Error::LookupTimeout(_) => ErrorKind::Lookup,
        }
    }

    /// Returns true if the error came from reading or parsing a file.
    ///
    /// Such errors abort the operation; nothing is partially reported.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io | ErrorKind::Parse)
    }

    /// Returns true if the caller can fix the problem by changing its input
    /// and retrying, e.g. by supplying explicit join keys.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidInput | ErrorKind::NotFound)
    }

    /// Returns true if the error is a type-lookup timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::LookupTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_fatal_and_mention_the_file() {
        let err = Error::parse("/data/live.json", 42, "unexpected byte 'x'");
        assert!(err.is_fatal());
        assert!(!err.is_recoverable());
        let text = err.to_string();
        assert!(text.contains("/data/live.json"));
        assert!(text.contains("42"));
    }

    #[test]
    fn missing_relationship_is_recoverable() {
        let err = Error::no_relationship("a.json", "b.json");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("explicit"));
    }
}
