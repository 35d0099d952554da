//! Engine configuration
//!
//! Plain structs with sensible defaults, `with_*` builders and a shared
//! [`Validator`] trait. Nothing here is read from the environment; the CLI maps
//! its flags onto these types.

pub mod lookup;
pub mod query;
pub mod stream;
pub mod validation;

pub use lookup::LookupConfig;
pub use query::{InferenceConfig, QueryConfig};
pub use stream::StreamConfig;
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Complete configuration for a [`QueryEngine`](crate::query::QueryEngine)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub stream: StreamConfig,
    pub query: QueryConfig,
    pub inference: InferenceConfig,
}

impl EngineConfig {
    #[must_use]
    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }
}

impl Validator for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.stream.validate()?;
        self.query.validate()?;
        self.inference.validate()
    }
}
