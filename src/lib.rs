//! cloudmon-query - Query translation for Cloud Monitoring data sources
//!
//! This library provides:
//! - Canonical and persisted query types
//! - Migration of every historical query layout into the canonical one
//! - Template variable interpolation into filters, group-bys and scalars
//! - The aligner / reducer compatibility matrix
//! - Cached label and resource discovery
//! - Cloud Monitoring API request construction
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `model/` - queries, filters, metric descriptors
//! - `catalog/` - static option tables and compatibility lookups
//! - `config` - data-source settings
//!
//! **Verb modules** (transformations):
//! - `parser/` - JSON / YAML → PersistedQuery, DataSourceSettings
//! - `migrator/` - PersistedQuery → CanonicalQuery
//! - `codec/` - flat filter strings ⇄ Filter
//! - `interpolate/` - template text + variables → text
//! - `applier/` - CanonicalQuery + variables → interpolated CanonicalQuery
//! - `request/` - CanonicalQuery + time range → CloudMonitoringRequest
//! - `discovery/` - path → cached resource list
//!
//! # Example
//!
//! ```ignore
//! use cloudmon_query::{parser, migrate, QueryApplier, ScopedVars, build_request};
//!
//! let settings = parser::parse_settings_file("datasource.yaml")?;
//! let persisted = parser::parse_queries_file("panel.json")?;
//! let applier = QueryApplier::new(settings, variables);
//! for query in persisted.into_iter().map(migrate) {
//!     if applier.should_run(&query) {
//!         let request = build_request(&applier.apply(&query, &ScopedVars::new()), &context)?;
//!     }
//! }
//! ```

pub mod model;
pub mod codec;
pub mod catalog;
pub mod interpolate;
pub mod discovery;
pub mod migrator;
pub mod applier;
pub mod request;
pub mod config;
pub mod parser;
pub mod error;

// Re-export commonly used types
pub use model::{
    CanonicalQuery, Filter, FilterCondition, FilterOperator, MetricDescriptor, MetricKind, PersistedQuery,
    PreprocessorType, QueryPayload, QueryType, SelectableValue, ValueType,
};
pub use codec::{decode, encode, FilterError};
pub use catalog::{alignments_for, aggregations_for, resolve_alignment, AlignmentResolution};
pub use interpolate::{ScopedVars, TemplateInterpolator, TemplateVariable, TemplateVariables, VariableResolver, VariableValue};
pub use discovery::{AppEvent, EventSink, FetchError, GetOptions, LabelDiscoveryCache, ResourceFetcher};
pub use migrator::{migrate, migrate_value, LegacyShape, MigrateError};
pub use applier::QueryApplier;
pub use request::{build_request, CloudMonitoringRequest, RequestContext, RequestError, TimeRange};
pub use config::{AuthenticationType, DataSourceSettings};
pub use error::ParseError;
