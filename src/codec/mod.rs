//! Filter codec (verb module)
//!
//! Converts between the flat string form persisted in queries and structured
//! [`Filter`](crate::model::Filter) records.

mod error;
mod filter;

pub use error::FilterError;
pub use filter::{
    decode, encode, fold_metric_type, get_metric_type, get_metric_type_filter, set_metric_type,
    set_metric_type_filter, METRIC_TYPE_KEY,
};
