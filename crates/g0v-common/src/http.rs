use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::CommonError;

#[derive(Clone, Debug)]
pub struct JsonClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl JsonClientConfig {
    /// Pause before the `retry`-th retry (1-based): `initial_backoff` doubled
    /// per retry, capped at `max_backoff`, then stretched by up to a quarter.
    fn retry_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        let base = self.initial_backoff.saturating_mul(factor).min(self.max_backoff);
        base + jitter(base / 4)
    }
}

impl Default for JsonClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "g0v-tools/regdocs-dashboard".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(5_000),
            max_error_body_bytes: 8 * 1024,
        }
    }
}

/// Thin JSON-over-HTTP GET client with bounded retry.
///
/// Transient failures (timeouts, connection errors, 429 and 5xx responses) are
/// retried with exponential backoff and jitter. Anything else, including a body
/// that is not valid JSON for the requested type, fails immediately.
#[derive(Clone)]
pub struct JsonClient {
    config: JsonClientConfig,
    http: reqwest::Client,
}

impl JsonClient {
    pub fn new(config: JsonClientConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(CommonError::Client)?;
        Ok(Self { config, http })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CommonError> {
        let http = &self.http;
        let config = &self.config;
        request_with_retry(config, move || async move {
            debug!(url, "GET");
            let resp = http
                .get(url)
                .timeout(config.timeout)
                .send()
                .await
                .map_err(|source| CommonError::Request {
                    url: url.to_string(),
                    source,
                })?;

            let status = resp.status();
            if !status.is_success() {
                let body = match resp.bytes().await {
                    Ok(bytes) => excerpt(&bytes, config.max_error_body_bytes),
                    Err(e) => {
                        warn!(url, error = %e, "could not read error body");
                        String::new()
                    }
                };
                return Err(CommonError::Upstream {
                    url: url.to_string(),
                    status,
                    body,
                });
            }

            let bytes = resp.bytes().await.map_err(|source| CommonError::Request {
                url: url.to_string(),
                source,
            })?;
            serde_json::from_slice::<T>(&bytes).map_err(|source| CommonError::InvalidJson {
                url: url.to_string(),
                source,
            })
        })
        .await
    }
}

async fn request_with_retry<T, Fut, F>(config: &JsonClientConfig, mut f: F) -> Result<T, CommonError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CommonError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempt > config.max_retries || !should_retry(&e) {
                    return Err(e);
                }
                let delay = config.retry_delay(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    url = e.url(),
                    error = %e,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn should_retry(err: &CommonError) -> bool {
    match err {
        CommonError::Request { source, .. } => {
            source.is_timeout() || source.is_connect() || source.is_request() || source.is_body()
        }
        CommonError::Upstream { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        CommonError::InvalidJson { .. } | CommonError::Client(_) => false,
    }
}

/// Uniform-ish extra wait in `0..=spread`, seeded from the clock.
fn jitter(spread: Duration) -> Duration {
    let spread_ms = u64::try_from(spread.as_millis()).unwrap_or(u64::MAX);
    if spread_ms == 0 {
        return Duration::ZERO;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);
    Duration::from_millis(seed % spread_ms.saturating_add(1))
}

/// At most `limit` bytes of an upstream error body, lossily decoded.
fn excerpt(bytes: &[u8], limit: usize) -> String {
    String::from_utf8_lossy(&bytes[..bytes.len().min(limit)]).into_owned()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_config(max_retries: u32) -> JsonClientConfig {
        JsonClientConfig {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            ..JsonClientConfig::default()
        }
    }

    fn upstream(status: StatusCode) -> CommonError {
        CommonError::Upstream {
            url: "https://example.test/x.json".to_string(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn retry_delay_doubles_then_caps() {
        let config = JsonClientConfig {
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(1_000),
            ..JsonClientConfig::default()
        };
        let first = config.retry_delay(1);
        assert!(first >= Duration::from_millis(200) && first <= Duration::from_millis(250));
        let second = config.retry_delay(2);
        assert!(second >= Duration::from_millis(400) && second <= Duration::from_millis(500));
        for retry in [4, 33, 200, u32::MAX] {
            let d = config.retry_delay(retry);
            // cap plus at most a quarter of jitter
            assert!(d >= Duration::from_millis(1_000), "retry {retry}: {d:?}");
            assert!(d <= Duration::from_millis(1_250), "retry {retry}: {d:?}");
        }
    }

    #[test]
    fn error_excerpt_is_bounded() {
        assert_eq!(excerpt(b"service unavailable", 7), "service");
        assert_eq!(excerpt(b"short", 100), "short");
        // a cut through a multi-byte char decodes lossily instead of failing
        assert_eq!(excerpt("åa".as_bytes(), 1), "\u{FFFD}");
    }

    #[test]
    fn retry_policy_by_status() {
        assert!(should_retry(&upstream(StatusCode::SERVICE_UNAVAILABLE)));
        assert!(should_retry(&upstream(StatusCode::TOO_MANY_REQUESTS)));
        assert!(!should_retry(&upstream(StatusCode::NOT_FOUND)));

        let bad_json = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        assert!(!should_retry(&CommonError::InvalidJson {
            url: "u".to_string(),
            source: bad_json,
        }));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = request_with_retry(&fast_config(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(upstream(StatusCode::BAD_GATEWAY))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = request_with_retry(&fast_config(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(upstream(StatusCode::INTERNAL_SERVER_ERROR)) }
        })
        .await;

        assert!(matches!(result, Err(CommonError::Upstream { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = request_with_retry(&fast_config(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(upstream(StatusCode::NOT_FOUND)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
