//! Configuration validation
//!
//! Every engine configuration struct implements [`Validator`]; the range
//! checks they share live on [`ConfigValidator`].

use std::time::Duration;

/// Largest accepted chunk or token buffer
const MAX_BUFFER_BYTES: usize = 1 << 30;

/// Longest accepted lookup timeout
const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// A setting outside its accepted range
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("invalid buffer size: {0}")]
    InvalidBufferSize(String),

    #[error("invalid setting: {0}")]
    InvalidParameter(String),

    /// Two settings that are valid alone but not together
    #[error("conflicting settings: {0}")]
    Conflict(String),
}

pub trait Validator {
    /// Check every setting, stopping at the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigurationError`] describing that setting.
    fn validate(&self) -> ConfigResult<()>;
}

/// Range checks shared by the configuration structs
pub struct ConfigValidator;

impl ConfigValidator {
    /// `timeout` must be non-zero and at most one hour.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidTimeout`] naming `name`.
    pub fn validate_timeout(timeout: Duration, name: &str) -> ConfigResult<()> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!("{name} must be non-zero")));
        }
        if timeout > MAX_TIMEOUT {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} of {timeout:?} exceeds {MAX_TIMEOUT:?}"
            )));
        }
        Ok(())
    }

    /// `size` must be between one byte and 1 GiB.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidBufferSize`] naming `name`.
    pub fn validate_buffer_size(size: usize, name: &str) -> ConfigResult<()> {
        if size == 0 || size > MAX_BUFFER_BYTES {
            return Err(ConfigurationError::InvalidBufferSize(format!(
                "{name} must be between 1 and {MAX_BUFFER_BYTES} bytes, got {size}"
            )));
        }
        Ok(())
    }

    /// `value` must be a percentage in `0.0..=100.0`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidParameter`] for NaN or out-of-range values.
    pub fn validate_percentage(value: f64, name: &str) -> ConfigResult<()> {
        if !(0.0..=100.0).contains(&value) {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between 0 and 100, got {value}"
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidParameter`] if `value` is zero.
    pub fn validate_positive(value: usize, name: &str) -> ConfigResult<()> {
        if value == 0 {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be greater than zero"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_reject_nan_and_out_of_range() {
        assert!(ConfigValidator::validate_percentage(30.0, "min_coverage").is_ok());
        assert!(ConfigValidator::validate_percentage(f64::NAN, "min_coverage").is_err());
        assert!(ConfigValidator::validate_percentage(100.5, "min_coverage").is_err());
    }

    #[test]
    fn buffer_sizes_are_bounded() {
        assert!(ConfigValidator::validate_buffer_size(1, "chunk_size").is_ok());
        assert!(ConfigValidator::validate_buffer_size(MAX_BUFFER_BYTES + 1, "chunk_size").is_err());
    }
}
