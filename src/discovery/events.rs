//! Application events raised by discovery

/// An event for the surrounding application to surface to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A data source request failed
    DataSourceRequestError { message: String },
}

/// Receives [`AppEvent`]s
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AppEvent);
}

/// Sink that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: AppEvent) {
        match event {
            AppEvent::DataSourceRequestError { message } => {
                tracing::warn!(%message, "data source request error");
            }
        }
    }
}
