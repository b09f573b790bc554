//! Request building (verb module)
//!
//! Interpolated CanonicalQuery + time range → Cloud Monitoring API request.
//! This is the only place alignment period sentinels are resolved.

mod build;
mod error;
mod filter;
mod params;
mod period;

pub use build::{build_request, CloudMonitoringRequest, RequestContext, TimeRange};
pub use error::RequestError;
pub use filter::{build_filter_string, build_slo_filter, interpolate_filter_wildcards};
pub use params::QueryParams;
pub use period::{calculate_alignment_period, graph_period_suffix, GRAPH_PERIOD_AUTO, GRAPH_PERIOD_DISABLED};
