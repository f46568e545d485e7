//! Retry utilities for outbound HTTP calls to upstream data sources.
//!
//! Provides configurable retry logic with exponential backoff and jitter.

use rand::Rng;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Initial backoff duration before first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to backoff duration.
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            backoff_multiplier: 1.7,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the specified max retries.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a config with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let backoff_ms = backoff.min(self.max_backoff.as_millis() as f64) as u64;

        let mut duration = Duration::from_millis(backoff_ms);

        if self.add_jitter {
            // Up to 50% jitter
            let jitter = (backoff_ms as f64 * 0.5 * rand::thread_rng().gen_range(0.0..1.0)) as u64;
            duration += Duration::from_millis(jitter);
        }

        duration
    }
}

/// Determines if an outbound request failure is worth retrying: timeouts,
/// connect failures, 429 and 5xx.
pub fn is_retryable(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }

    match err.status() {
        Some(status) => status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
        None => false,
    }
}

/// Execute an HTTP call with retry logic.
///
/// # Example
/// ```ignore
/// let body = retry_http_call(&RetryConfig::default(), "schedule", || async {
///     client.get(url).send().await?.error_for_status()?.json::<Value>().await
/// })
/// .await?;
/// ```
pub async fn retry_http_call<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<T, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "HTTP call succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    warn!(
                        operation = operation_name,
                        status = ?err.status(),
                        error = %err,
                        "HTTP call failed with non-retryable error"
                    );
                    return Err(err);
                }

                if attempt >= config.max_retries {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        status = ?err.status(),
                        error = %err,
                        "HTTP call failed after max retries"
                    );
                    return Err(err);
                }

                let backoff = config.backoff_duration(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    status = ?err.status(),
                    error = %err,
                    backoff_ms = backoff.as_millis() as u64,
                    "HTTP call failed, retrying after backoff"
                );

                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = RetryConfig {
            backoff_multiplier: 2.0,
            add_jitter: false,
            ..Default::default()
        };

        assert_eq!(config.backoff_duration(0), Duration::from_millis(500));
        assert_eq!(config.backoff_duration(1), Duration::from_millis(1000));
        assert_eq!(config.backoff_duration(2), Duration::from_millis(2000));
        assert_eq!(config.backoff_duration(20), Duration::from_secs(8));
    }

    #[test]
    fn test_jitter_stays_within_half() {
        let config = RetryConfig::default();
        for attempt in 0..5 {
            let base = RetryConfig {
                add_jitter: false,
                ..config.clone()
            }
            .backoff_duration(attempt);
            let jittered = config.backoff_duration(attempt);
            assert!(jittered >= base);
            assert!(jittered <= base + base / 2);
        }
    }

    #[test]
    fn test_config_constructors() {
        assert_eq!(RetryConfig::with_max_retries(5).max_retries, 5);
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(b"NOT HTTP AT ALL\r\n\r\n").await;
            }
        });

        let client = reqwest::Client::new();
        let url = format!("http://{}/", addr);
        let config = RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            add_jitter: false,
        };

        let err = retry_http_call(&config, "malformed", || async {
            client.get(&url).send().await.map(|_| ())
        })
        .await
        .unwrap_err();

        assert!(!err.is_timeout());
        assert!(!err.is_connect());
        assert!(!is_retryable(&err));
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }
}
