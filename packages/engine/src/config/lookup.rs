//! Knowledge-base lookup process configuration

use std::time::Duration;

use super::validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// How to launch and talk to the knowledge-base process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Executable to spawn
    pub program: String,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Maximum time to wait for one response line
    pub request_timeout: Duration,
}

impl LookupConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            request_timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Validator for LookupConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.program.trim().is_empty() {
            return Err(ConfigurationError::InvalidParameter(
                "lookup program cannot be empty".to_string(),
            ));
        }
        ConfigValidator::validate_timeout(self.request_timeout, "request_timeout")
    }
}
