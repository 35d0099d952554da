//! Stream configuration
//!
//! Read-chunk sizing and token limits for the tokenizing stream reader.

use super::validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Default number of bytes requested from the file per read.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default upper bound for a single buffered token (one string or number).
pub const DEFAULT_MAX_TOKEN_BYTES: usize = 64 * 1024 * 1024;

/// Runtime stream configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Bytes read from disk whenever the tokenizer runs out of input
    pub chunk_size: usize,
    /// Largest single token the tokenizer will buffer before failing
    pub max_token_bytes: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_token_bytes: DEFAULT_MAX_TOKEN_BYTES,
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_max_token_bytes(mut self, max_token_bytes: usize) -> Self {
        self.max_token_bytes = max_token_bytes;
        self
    }

    /// Memory-constrained configuration with small reads
    #[must_use]
    pub fn low_memory() -> Self {
        Self {
            chunk_size: 4096,
            max_token_bytes: 4 * 1024 * 1024,
        }
    }
}

impl Validator for StreamConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_buffer_size(self.chunk_size, "chunk_size")?;
        ConfigValidator::validate_buffer_size(self.max_token_bytes, "max_token_bytes")?;
        if self.max_token_bytes < self.chunk_size {
            return Err(ConfigurationError::Conflict(
                "max_token_bytes must be at least chunk_size".to_string(),
            ));
        }
        Ok(())
    }
}
