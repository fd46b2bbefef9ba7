//! Resilient request client
//!
//! Wraps a [`Transport`] with a bounded number of attempts, a deadline per
//! attempt and a linearly growing pause between attempts.
//!
//! Outcome per attempt:
//! - success status: returned immediately, never retried
//! - non-success status: retried; on the last attempt becomes
//!   [`GeminiError::Upstream`] with the body's `error.message`
//! - deadline elapsed: retried; on the last attempt becomes
//!   [`GeminiError::Timeout`]
//! - transport failure: retried; on the last attempt becomes
//!   [`GeminiError::ExhaustedRetries`]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::transport::{HttpRequest, RawResponse, Transport};
use super::types::extract_error_message;
use super::{GeminiError, TIMEOUT_MESSAGE, UPSTREAM_FALLBACK_MESSAGE};
use crate::config::RetryConfig;

/// Attempt budget, deadline and pauses for one logical request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    per_attempt_timeout: Duration,
    backoff_schedule: Vec<Duration>,
}

impl RetryPolicy {
    /// Linear policy: the pause after attempt `i` is `(i + 1) * step`
    ///
    /// `max_attempts` below 1 is raised to 1.
    pub fn linear(max_attempts: u32, per_attempt_timeout: Duration, step: Duration) -> Self {
        let max_attempts = max_attempts.max(1);
        let backoff_schedule = (1..max_attempts).map(|n| step * n).collect();
        Self {
            max_attempts,
            per_attempt_timeout,
            backoff_schedule,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        self.per_attempt_timeout
    }

    /// Pause taken after the failed attempt with index `attempt`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_schedule
            .get(attempt as usize)
            .or_else(|| self.backoff_schedule.last())
            .copied()
            .unwrap_or_default()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::linear(config.max_attempts, config.timeout(), config.backoff_step())
    }
}

/// Suspends between attempts
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Real-time pause backed by the Tokio timer
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Transport wrapped in a [`RetryPolicy`]
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    pause: Arc<dyn Pause>,
    policy: RetryPolicy,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            pause: Arc::new(TokioPause),
            policy,
        }
    }

    /// Swap the pause implementation (tests record pauses instead of sleeping)
    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deliver `request`, returning the first success response
    pub async fn send(&self, request: &HttpRequest) -> Result<RawResponse, GeminiError> {
        let attempts = self.policy.max_attempts;
        let deadline = self.policy.per_attempt_timeout;
        debug!(url = %request.url, %attempts, ?deadline, "ResilientClient::send: called");

        let mut last_message = UPSTREAM_FALLBACK_MESSAGE.to_string();
        for attempt in 0..attempts {
            let is_last = attempt + 1 == attempts;

            match tokio::time::timeout(deadline, self.transport.send(request)).await {
                Ok(Ok(response)) if response.is_success() => {
                    debug!(attempt, status = response.status, "ResilientClient::send: success");
                    return Ok(response);
                }
                Ok(Ok(response)) => {
                    let message =
                        extract_error_message(&response.body).unwrap_or_else(|| UPSTREAM_FALLBACK_MESSAGE.to_string());
                    debug!(attempt, status = response.status, %message, "ResilientClient::send: non-success status");
                    if is_last {
                        return Err(GeminiError::Upstream {
                            status: response.status,
                            message,
                        });
                    }
                    last_message = message;
                }
                Ok(Err(e)) => {
                    debug!(attempt, error = %e, "ResilientClient::send: transport error");
                    if is_last {
                        return Err(GeminiError::ExhaustedRetries {
                            attempts,
                            last_message: e.to_string(),
                        });
                    }
                    last_message = e.to_string();
                }
                Err(_) => {
                    debug!(attempt, ?deadline, "ResilientClient::send: attempt timed out");
                    if is_last {
                        return Err(GeminiError::Timeout { after: deadline });
                    }
                    last_message = TIMEOUT_MESSAGE.to_string();
                }
            }

            let backoff = self.policy.backoff_for(attempt);
            warn!(
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                reason = %last_message,
                "send: retrying after failed attempt"
            );
            self.pause.pause(backoff).await;
        }

        // Only reachable if the loop body never ran; the policy guarantees it does
        Err(GeminiError::ExhaustedRetries { attempts, last_message })
    }
}
