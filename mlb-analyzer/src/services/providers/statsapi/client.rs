//! HTTP client for the MLB StatsAPI with response caching and retries.

use crate::config::StatsApiConfig;
use crate::services::providers::ProviderError;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::http::{retry_http_call, RetryConfig};
use std::time::{Duration, Instant};

const CACHE_MAX_ENTRIES: usize = 2048;

/// In-memory response cache with a fixed time-to-live.
///
/// When more than `max_entries` are held the oldest inserts are dropped.
pub struct TtlCache {
    ttl: Duration,
    max_entries: usize,
    entries: DashMap<String, (Instant, Value)>,
}

impl TtlCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        {
            let entry = self.entries.get(key)?;
            let (stored_at, value) = entry.value();
            if stored_at.elapsed() <= self.ttl {
                return Some(value.clone());
            }
        }

        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: String, value: Value) {
        self.entries.insert(key, (Instant::now(), value));
        self.evict_overflow();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_overflow(&self) {
        let overflow = self.entries.len().saturating_sub(self.max_entries);
        if overflow == 0 {
            return;
        }

        let mut by_age: Vec<(Instant, String)> = self
            .entries
            .iter()
            .map(|e| (e.value().0, e.key().clone()))
            .collect();
        by_age.sort();

        for (_, key) in by_age.into_iter().take(overflow) {
            self.entries.remove(&key);
        }
    }
}

/// Cache key: path plus params sorted by name.
pub fn cache_key(path: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort();
    let query: Vec<String> = sorted.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", path, query.join("&"))
}

pub struct StatsApiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
    cache: TtlCache,
}

impl StatsApiClient {
    pub fn new(config: &StatsApiConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry: RetryConfig::with_max_retries(config.max_retries),
            cache: TtlCache::new(
                Duration::from_secs(config.cache_ttl_secs),
                CACHE_MAX_ENTRIES,
            ),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// GET `path` as JSON. `Ok(None)` when upstream answers 400 or 404.
    pub async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Value>, ProviderError> {
        let key = cache_key(path, params);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(path, "StatsAPI cache hit");
            return Ok(Some(hit));
        }

        let url = format!("{}{}", self.base_url, path);
        let body = retry_http_call(&self.retry, path, || async {
            let mut request = self.http.get(&url).query(params);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().await?;
            if matches!(
                response.status(),
                StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND
            ) {
                return Ok::<_, reqwest::Error>(None);
            }
            let value = response.error_for_status()?.json::<Value>().await?;
            Ok(Some(value))
        })
        .await?;

        if let Some(value) = &body {
            self.cache.insert(key, value.clone());
        } else {
            tracing::debug!(path, "StatsAPI returned no data");
        }
        Ok(body)
    }

    /// Like [`get_json`](Self::get_json), decoded into `T`; no data decodes
    /// as `T::default()`.
    pub async fn get<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, ProviderError>
    where
        T: DeserializeOwned + Default,
    {
        match self.get_json(path, params).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> StatsApiClient {
        let config = StatsApiConfig {
            base_url: server.uri(),
            api_key: api_key.map(String::from),
            ..Default::default()
        };
        StatsApiClient::new(&config).unwrap().with_retry(RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            add_jitter: false,
        })
    }

    #[test]
    fn cache_key_sorts_params() {
        let a = cache_key("/x", &[("b", "2".into()), ("a", "1".into())]);
        let b = cache_key("/x", &[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(a, b);
        assert_eq!(a, "/x?a=1&b=2");
    }

    #[test]
    fn cache_entries_expire() {
        let cache = TtlCache::new(Duration::from_millis(1), 8);
        cache.insert("k".into(), json!(1));
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_evicts_oldest_when_full() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("first".into(), json!(1));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("second".into(), json!(2));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("third".into(), json!(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("first").is_none());
        assert_eq!(cache.get("third"), Some(json!(3)));
    }

    #[tokio::test]
    async fn caches_successful_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/schedule"))
            .and(query_param("date", "2024-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dates": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let params = [("date", "2024-06-01".to_string())];

        let first = client.get_json("/api/v1/schedule", &params).await.unwrap();
        let second = client.get_json("/api/v1/schedule", &params).await.unwrap();
        assert_eq!(first, Some(json!({"dates": []})));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn not_found_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert_eq!(client.get_json("/api/v1/people/1/stats", &[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn retries_server_errors_then_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.get_json("/api/v1/schedule", &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Upstream(_)));
    }

    #[tokio::test]
    async fn sends_bearer_key_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let body = client.get_json("/api/v1/ping", &[]).await.unwrap();
        assert_eq!(body, Some(json!({"ok": true})));
    }
}
