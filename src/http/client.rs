//! HTTP client with retry and rate limiting
//!
//! Provides a robust HTTP client that handles:
//! - Minimum spacing between requests, as returned by [`BackoffPolicy`]
//! - A per-minute quota (token bucket)
//! - Retries driven by [`BackoffPolicy`]
//! - Default query parameters (used for the API key)
//! - Error classification for retry decisions

use super::backoff::{BackoffConfig, BackoffPolicy, Decision, Outcome};
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Configuration for the HTTP client
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Retry policy
    pub backoff: BackoffConfig,
    /// Per-minute quota enforced by a token bucket, on top of the spacing
    /// the retry policy asks for after each success
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default query parameters for all requests
    pub default_query: BTreeMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let backoff = BackoffConfig::default();
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            rate_limit: Some(RateLimiterConfig::per_minute(backoff.requests_per_minute)),
            backoff,
            default_query: BTreeMap::new(),
            user_agent: format!("fda-enforcement-connector/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

// Default query parameters carry the API key, keep them out of logs.
impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .field("rate_limit", &self.rate_limit)
            .field("default_query", &self.default_query.keys())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.backoff.max_retries = retries;
        self
    }

    /// Replace the retry policy
    pub fn backoff(mut self, backoff: BackoffConfig) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Set the per-minute request ceiling (also drives the rate limiter)
    pub fn requests_per_minute(mut self, rpm: u32) -> Self {
        self.config.backoff.requests_per_minute = rpm;
        self.config.rate_limit = Some(RateLimiterConfig::per_minute(rpm));
        self
    }

    /// Disable the per-minute quota; the spacing from the retry policy
    /// still applies
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_query.insert(key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Per-request query parameters, merged over the client defaults
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: BTreeMap<String, String>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
    /// Earliest moment the next request may start, set from the spacing the
    /// backoff policy returns after each success
    next_slot: Mutex<Option<Instant>>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
            next_slot: Mutex::new(None),
        })
    }

    /// Make a GET request and return the response body.
    ///
    /// The body is read inside the retry loop, so a connection dropped while
    /// the body streams in is retried like any other transport failure.
    /// Only one attempt is ever in flight; every attempt first waits out the
    /// spacing from the previous success and then the rate limiter.
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<String> {
        let full_url = self.build_url(url);
        let timeout = self.config.timeout;
        let mut policy = BackoffPolicy::new(self.config.backoff.clone());

        loop {
            self.wait_turn().await;

            let response = match self.build_request(&full_url, &config, timeout).send().await {
                Ok(response) => response,
                Err(e) => {
                    let error = Error::Http(e);
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    self.retry_transport(&mut policy, error, timeout).await?;
                    continue;
                }
            };

            let status = response.status();
            match Outcome::from_status(status, extract_retry_after(&response)) {
                Outcome::Success => match response.text().await {
                    Ok(body) => {
                        if let Decision::Proceed { spacing } = policy.decide(&Outcome::Success) {
                            *self.next_slot.lock().await = Some(Instant::now() + spacing);
                        }
                        debug!(url = %full_url, status = status.as_u16(), bytes = body.len(), "Request succeeded");
                        return Ok(body);
                    }
                    Err(e) => {
                        self.retry_transport(&mut policy, Error::Http(e), timeout)
                            .await?;
                    }
                },
                outcome => match policy.decide(&outcome) {
                    Decision::Retry { delay } => {
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            policy.retries(),
                            policy.config().max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    Decision::GiveUp | Decision::Proceed { .. } => {
                        return Err(give_up_error(status, response, policy.retries()).await);
                    }
                },
            }
        }
    }

    /// Wait for the spacing slot, then for a rate limiter permit
    async fn wait_turn(&self) {
        let slot = *self.next_slot.lock().await;
        if let Some(at) = slot {
            tokio::time::sleep_until(at).await;
        }
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    fn build_request(&self, url: &str, config: &RequestConfig, timeout: Duration) -> RequestBuilder {
        let mut req = self.client.get(url);

        let query: Vec<(&String, &String)> = self
            .config
            .default_query
            .iter()
            .chain(config.query.iter())
            .collect();
        if !query.is_empty() {
            req = req.query(&query);
        }

        req.timeout(timeout)
    }

    /// Sleep before retrying a transport failure, or surface it once the
    /// policy gives up
    async fn retry_transport(
        &self,
        policy: &mut BackoffPolicy,
        error: Error,
        timeout: Duration,
    ) -> Result<()> {
        match policy.decide(&Outcome::Transport) {
            Decision::Retry { delay } => {
                warn!(
                    "Transport error ({error}), attempt {}/{}, retrying in {:?}",
                    policy.retries(),
                    policy.config().max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                Ok(())
            }
            _ => match error {
                Error::Http(ref e) if e.is_timeout() => Err(Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
                other => Err(other),
            },
        }
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Build the error for a response the policy will not retry
async fn give_up_error(status: StatusCode, response: Response, retries: u32) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Error::RateLimited { retries };
    }
    let body = response.text().await.unwrap_or_default();
    Error::HttpStatus {
        status: status.as_u16(),
        body,
    }
}

/// Extract retry-after header value (seconds form only)
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
