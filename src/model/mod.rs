//! Query model types (nouns)
//!
//! These types represent persisted and canonical queries, filters and metric
//! metadata.

mod filter;
mod legacy;
mod metric;
mod query;
mod selectable;

pub use filter::{Filter, FilterCondition, FilterOperator, ParseFilterTokenError};
pub use legacy::{LegacyMetricQuery, PersistedQuery, PersistedSloQuery};
pub(crate) use legacy::read_lenient;
pub use metric::{MetricDescriptor, MetricKind, ParseMetricEnumError, PreprocessorType, ValueType};
pub use query::{
    AnnotationQuery, CanonicalQuery, QueryPayload, QueryType, SloQuery, TimeSeriesList, TimeSeriesQuery,
};
pub use selectable::{OptionGroup, SelectableValue};
