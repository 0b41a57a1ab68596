//! Timeout and bounded-retry wrapper for calls to external providers.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamPolicy {
    /// Deadline for a single attempt.
    pub timeout: Duration,
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further retry.
    pub backoff_base: Duration,
}

impl Default for UpstreamPolicy {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(60), max_attempts: 3, backoff_base: Duration::from_millis(500) }
    }
}

impl UpstreamPolicy {
    /// Run `op` under the deadline, retrying transient failures with
    /// exponential backoff. Timeouts and non-transient errors return at once.
    pub async fn call<T, F, Fut>(&self, service: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            let outcome = match tokio::time::timeout(self.timeout, op()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(Error::UpstreamTimeout { service: service.to_string(), after: self.timeout });
                }
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = self.backoff_base.saturating_mul(1u32 << (attempt - 1).min(16));
                    warn!(service, attempt, max_attempts = attempts, ?delay, error = %e, "Transient upstream failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
