//! Retry and backoff policy
//!
//! Maps the outcome of one HTTP attempt to what the client does next:
//! proceed (after the minimum spacing), retry after a delay, or give up.
//! The only state is the retry count of the request in flight.

use crate::error::is_retryable_status;
use crate::types::BackoffType;
use reqwest::StatusCode;
use std::time::Duration;

/// Tuning for [`BackoffPolicy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Request ceiling used to derive the minimum spacing between requests
    pub requests_per_minute: u32,
    /// Retries allowed per request (attempts = retries + 1)
    pub max_retries: u32,
    /// Shape of the delay curve
    pub backoff_type: BackoffType,
    /// First delay after a rate-limit response
    pub rate_limit_base: Duration,
    /// First delay after a server error or transport failure
    pub server_error_base: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 240,
            max_retries: 3,
            backoff_type: BackoffType::Exponential,
            rate_limit_base: Duration::from_secs(2),
            server_error_base: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl BackoffConfig {
    /// Minimum spacing between consecutive requests
    pub fn min_spacing(&self) -> Duration {
        Duration::from_secs(60) / self.requests_per_minute.max(1)
    }
}

/// Outcome of a single HTTP attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx (or any non-error status)
    Success,
    /// HTTP 429, with the server's `Retry-After` hint if it sent one
    RateLimited { retry_after: Option<Duration> },
    /// 5xx
    ServerError { status: u16 },
    /// Timeout, refused or dropped connection, or a body cut off mid-read
    Transport,
    /// 4xx other than 429
    ClientError { status: u16 },
}

impl Outcome {
    /// Classify an HTTP status code
    pub fn from_status(status: StatusCode, retry_after: Option<Duration>) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited { retry_after }
        } else if is_retryable_status(status.as_u16()) {
            Self::ServerError {
                status: status.as_u16(),
            }
        } else if status.is_client_error() {
            Self::ClientError {
                status: status.as_u16(),
            }
        } else {
            Self::Success
        }
    }
}

/// What to do after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Accept the response; the next request must wait at least `spacing`
    Proceed { spacing: Duration },
    /// Sleep for `delay`, then retry the same request
    Retry { delay: Duration },
    /// Stop retrying and surface the failure
    GiveUp,
}

/// Per-request retry policy
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    config: BackoffConfig,
    attempt: u32,
}

impl BackoffPolicy {
    /// Create a policy for a new request
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Number of retries already granted for this request
    pub fn retries(&self) -> u32 {
        self.attempt
    }

    /// Get the configuration
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Start counting retries from zero again
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Decide what happens after `outcome`
    pub fn decide(&mut self, outcome: &Outcome) -> Decision {
        match outcome {
            Outcome::Success => {
                self.reset();
                Decision::Proceed {
                    spacing: self.config.min_spacing(),
                }
            }
            Outcome::ClientError { .. } => Decision::GiveUp,
            Outcome::RateLimited { retry_after } => {
                let delay = match retry_after {
                    Some(hint) => (*hint).min(self.config.max_delay),
                    None => self.delay_for(self.config.rate_limit_base),
                };
                self.retry_after(delay)
            }
            Outcome::ServerError { .. } | Outcome::Transport => {
                let delay = self.delay_for(self.config.server_error_base);
                self.retry_after(delay)
            }
        }
    }

    /// Delay for the current attempt starting from `base`
    pub fn delay_for(&self, base: Duration) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => base,
            BackoffType::Linear => base.saturating_mul(self.attempt.saturating_add(1)),
            BackoffType::Exponential => base.saturating_mul(2u32.saturating_pow(self.attempt)),
        };
        delay.min(self.config.max_delay)
    }

    fn retry_after(&mut self, delay: Duration) -> Decision {
        if self.attempt >= self.config.max_retries {
            return Decision::GiveUp;
        }
        self.attempt += 1;
        Decision::Retry { delay }
    }
}
