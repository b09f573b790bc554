//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use cloudmon_query::{
    discovery::{AppEvent, EventSink, FetchError, LabelDiscoveryCache, ResourceFetcher},
    parser, DataSourceSettings, PersistedQuery, RequestContext, TimeRange,
};

/// Load a JSON fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> Value {
    let path = format!("tests/test_data/{}", name);
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", name, e))
}

/// Load a panel's persisted queries from the tests/test_data directory
pub fn load_queries(name: &str) -> Vec<PersistedQuery> {
    let path = format!("tests/test_data/{}", name);
    parser::parse_queries_file(&path).unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// Load data-source settings from the tests/test_data directory
pub fn load_settings(name: &str) -> DataSourceSettings {
    let path = format!("tests/test_data/{}", name);
    parser::parse_settings_file(&path).unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// 2018-03-15 13:00 to 13:34 UTC with a one second interval
pub fn request_context() -> RequestContext {
    let from = Utc.with_ymd_and_hms(2018, 3, 15, 13, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2018, 3, 15, 13, 34, 0).unwrap();
    RequestContext::new(TimeRange::new(from, to).unwrap(), 1000)
}

// =============================================================================
// Discovery fakes
// =============================================================================

/// Fetcher answering from canned bodies keyed by URL and recording every call
///
/// Unknown URLs fail with a 404.
#[derive(Default)]
pub struct RecordingFetcher {
    responses: Mutex<HashMap<String, Result<Value, FetchError>>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before answering, so concurrent requests overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(self, url: &str, body: Value) -> Self {
        self.set_response(url, Ok(body));
        self
    }

    pub fn fail(self, url: &str, error: FetchError) -> Self {
        self.set_response(url, Err(error));
        self
    }

    pub fn set_response(&self, url: &str, response: Result<Value, FetchError>) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ResourceFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::http(404, "Not Found")))
    }
}

/// Sink keeping every event it receives
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AppEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: AppEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A cache over `fetcher` with a recording sink
pub fn discovery_cache(fetcher: Arc<RecordingFetcher>) -> (LabelDiscoveryCache, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let cache = LabelDiscoveryCache::new("base/", fetcher, sink.clone());
    (cache, sink)
}
