//! Memoizing resource lookups
//!
//! Entries live for as long as the store does. There is no expiry; a request
//! with `use_cache: false` refreshes an entry. Concurrent misses on the same
//! path are not coalesced: each performs its own fetch and writes its own
//! result.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::events::{AppEvent, EventSink};
use super::fetch::{format_fetch_error, FetchError, ResourceFetcher};

/// Base URL of the monitoring API, relative to the data source proxy
pub const MONITORING_BASE_URL: &str = "cloudmonitoring/v3/projects/";
/// Base URL of the resource manager API, used to list projects
pub const RESOURCE_MANAGER_BASE_URL: &str = "cloudresourcemanager/v1/";

/// Path-keyed store of mapped response lists
///
/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct LabelStore {
    entries: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<Vec<Value>> {
        self.entries.read().await.get(path).cloned()
    }

    pub async fn insert(&self, path: impl Into<String>, values: Vec<Value>) {
        self.entries.write().await.insert(path.into(), values);
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.entries.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Maps each element of a response list before it is cached
pub type ResponseMap = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Options for [`LabelDiscoveryCache::get`]
#[derive(Clone)]
pub struct GetOptions {
    /// Serve from the cache when an entry exists
    pub use_cache: bool,
    /// Identity when unset
    pub response_map: Option<ResponseMap>,
    /// Overrides the cache's base URL for this request
    pub base_url: Option<String>,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            response_map: None,
            base_url: None,
        }
    }
}

impl fmt::Debug for GetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetOptions")
            .field("use_cache", &self.use_cache)
            .field("response_map", &self.response_map.is_some())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GetOptions {
    /// Always fetch, still refreshing the cache
    pub fn bypass_cache() -> Self {
        Self {
            use_cache: false,
            ..Self::default()
        }
    }

    pub fn with_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.response_map = Some(Arc::new(map));
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Key of the response list: the last path segment without its query string
pub fn response_key(path: &str) -> &str {
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    segment.split('?').next().unwrap_or_default()
}

/// Caching front for the backend's list endpoints
///
/// Failed requests are reported through the [`EventSink`] and answered with
/// an empty list, so callers cannot tell a failure from an empty result
/// without watching the events.
pub struct LabelDiscoveryCache {
    base_url: String,
    fetcher: Arc<dyn ResourceFetcher>,
    events: Arc<dyn EventSink>,
    store: LabelStore,
}

impl LabelDiscoveryCache {
    pub fn new(base_url: impl Into<String>, fetcher: Arc<dyn ResourceFetcher>, events: Arc<dyn EventSink>) -> Self {
        Self::with_store(base_url, fetcher, events, LabelStore::new())
    }

    /// Build a cache over an existing store
    pub fn with_store(
        base_url: impl Into<String>,
        fetcher: Arc<dyn ResourceFetcher>,
        events: Arc<dyn EventSink>,
        store: LabelStore,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
            events,
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &LabelStore {
        &self.store
    }

    /// List the resource at `path`
    pub async fn get(&self, path: &str, options: GetOptions) -> Vec<Value> {
        if options.use_cache {
            if let Some(cached) = self.store.get(path).await {
                tracing::trace!(path, "label cache hit");
                return cached;
            }
        }

        let base_url = options.base_url.as_deref().unwrap_or(&self.base_url);
        let url = format!("{}{}", base_url, path);

        let body = match self.fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                self.report(&url, &e);
                return Vec::new();
            }
        };

        let values: Vec<Value> = body
            .get(response_key(path))
            .and_then(Value::as_array)
            .map(|items| match &options.response_map {
                Some(map) => items.iter().map(|item| map(item)).collect(),
                None => items.clone(),
            })
            .unwrap_or_default();

        self.store.insert(path, values.clone()).await;
        values
    }

    /// Connectivity probe: fetch the project's metric descriptors unmapped
    /// and uncached
    pub async fn test(&self, project: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}/metricDescriptors", self.base_url, project);
        self.fetcher.fetch(&url).await
    }

    fn report(&self, url: &str, error: &FetchError) {
        let message = format_fetch_error(error);
        tracing::warn!(url, error = %error, "resource fetch failed");
        self.events.emit(AppEvent::DataSourceRequestError { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StaticFetcher {
        body: Result<Value, FetchError>,
        urls: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn new(body: Result<Value, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                body,
                urls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.urls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ResourceFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
            self.urls.lock().unwrap().push(url.to_string());
            self.body.clone()
        }
    }

    #[derive(Default)]
    struct CollectingSink(Mutex<Vec<AppEvent>>);

    impl EventSink for CollectingSink {
        fn emit(&self, event: AppEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_response_key() {
        assert_eq!(response_key("my-project/metricDescriptors"), "metricDescriptors");
        assert_eq!(response_key("my-project/services?pageSize=1000"), "services");
        assert_eq!(response_key("projects"), "projects");
        assert_eq!(response_key("p/services/s/serviceLevelObjectives/"), "serviceLevelObjectives");
    }

    #[tokio::test]
    async fn test_get_maps_and_caches() {
        let fetcher = StaticFetcher::new(Ok(json!({"projects": [{"projectId": "a"}, {"projectId": "b"}]})));
        let cache = LabelDiscoveryCache::new("base/", fetcher.clone(), Arc::new(CollectingSink::default()));

        let options = GetOptions::default().with_map(|v| v["projectId"].clone());
        let values = cache.get("projects", options.clone()).await;
        assert_eq!(values, vec![json!("a"), json!("b")]);
        assert_eq!(fetcher.urls.lock().unwrap()[0], "base/projects");

        let again = cache.get("projects", options).await;
        assert_eq!(again, values);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_response_key_is_empty() {
        let fetcher = StaticFetcher::new(Ok(json!({})));
        let cache = LabelDiscoveryCache::new("", fetcher, Arc::new(CollectingSink::default()));
        assert!(cache.get("p/metricDescriptors", GetOptions::default()).await.is_empty());
        assert!(cache.store().contains("p/metricDescriptors").await);
    }

    #[tokio::test]
    async fn test_failure_emits_event_and_returns_empty() {
        let fetcher = StaticFetcher::new(Err(FetchError::Transport("refused".into())));
        let sink = Arc::new(CollectingSink::default());
        let cache = LabelDiscoveryCache::new("", fetcher, sink.clone());

        assert!(cache.get("p/metricDescriptors", GetOptions::default()).await.is_empty());
        assert!(cache.store().is_empty().await);
        assert_eq!(
            sink.0.lock().unwrap().as_slice(),
            &[AppEvent::DataSourceRequestError {
                message: "Request failed: refused".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_probe_is_not_cached() {
        let fetcher = StaticFetcher::new(Ok(json!({"metricDescriptors": []})));
        let cache = LabelDiscoveryCache::new("base/", fetcher.clone(), Arc::new(CollectingSink::default()));
        cache.test("p").await.unwrap();
        cache.test("p").await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert!(cache.store().is_empty().await);
        assert_eq!(fetcher.urls.lock().unwrap()[0], "base/p/metricDescriptors");
    }
}
