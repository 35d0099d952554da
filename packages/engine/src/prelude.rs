//! entscan prelude
//!
//! The types most callers need to run queries. Lower-level pieces (the
//! tokenizer, shape builder, right-side join index) stay in their modules.

pub use crate::config::{EngineConfig, InferenceConfig, LookupConfig, QueryConfig, StreamConfig, Validator};
pub use crate::error::{Error, ErrorKind, Result};

pub use crate::filter::{FilterCondition, FilterOperator, FilterSet};
pub use crate::path::{PathExpression, PathSegment, get_value_at_path, get_values_at_path};
pub use crate::stream::{ElementStream, Source, StreamElement};

pub use crate::query::{
    AggregateFunction, AggregateOptions, AggregateResult, CountResult, DistributionResult,
    GroupByResult, QueryEngine, QueryOptions, QueryResult, QuerySource, StatsResult,
};

pub use crate::join::{JoinOptions, JoinResult};
pub use crate::relationships::{DetectedRelationship, RelationshipOptions, RelationshipReport, RelationshipType};
pub use crate::sample::{SampleOptions, SampleResult};
pub use crate::schema::{SchemaNode, SchemaOptions};

pub use crate::lookup::{ProcessTypeLookup, SymbolInfo, TypeLookup};
