//! Label and resource discovery
//!
//! A memoizing wrapper over the backend's list endpoints. The HTTP transport
//! is supplied by the caller as a [`ResourceFetcher`].

mod cache;
mod events;
mod fetch;
mod resources;

pub use cache::{
    response_key, GetOptions, LabelDiscoveryCache, LabelStore, ResponseMap, MONITORING_BASE_URL,
    RESOURCE_MANAGER_BASE_URL,
};
pub use events::{AppEvent, EventSink, TracingEventSink};
pub use fetch::{format_fetch_error, FetchError, ResourceFetcher};
