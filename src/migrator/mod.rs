//! Query migration (verb module)
//!
//! PersistedQuery → CanonicalQuery, whatever layout the query was saved in.

mod error;
mod migrate;
mod shape;

pub use error::MigrateError;
pub use migrate::{migrate, migrate_all, migrate_value, DEFAULT_VIEW};
pub use shape::{classify, LegacyShape, METRICS_QUERY_TYPE};
