//! Retry handling for collaborator calls.
//!
//! Collaborators sit in front of latency-bound providers, so transient
//! failures are expected. The schedule is exponential —
//! `initial_delay * exp_base^retry` — and a provider-supplied minimum delay
//! is honoured when it is longer than the scheduled one. Only collaborator
//! calls pass through here; core errors are never retried.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pipeline::{RetryPolicy, StageError};

/// Back-off schedule for collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per stage call, the first try included.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Multiplier applied per retry.
    #[serde(default = "default_exp_base")]
    pub exp_base: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

fn default_attempts() -> u32 {
    5
}

fn default_exp_base() -> u32 {
    7
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            exp_base: default_exp_base(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// The scheduled delay before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = u64::from(self.exp_base).saturating_pow(retry);
        Duration::from_millis(self.initial_delay_ms.saturating_mul(factor))
    }
}

/// Runs `call` until it succeeds, fails non-retryably, or spends the attempt
/// budget. The last error is returned unchanged.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, call: F) -> Result<T, StageError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, StageError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                let after = match err.retry_policy() {
                    RetryPolicy::NonRetryable => return Err(err),
                    RetryPolicy::Retryable { after } => after,
                };
                if attempt >= config.attempts {
                    return Err(err);
                }
                let mut delay = config.delay_for(attempt - 1);
                if let Some(hint) = after {
                    delay = delay.max(hint);
                }
                tracing::warn!(
                    stage = %err.stage(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "collaborator call failed; retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_exponentially() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(0), Duration::from_secs(1));
        assert_eq!(config.delay_for(1), Duration::from_secs(7));
        assert_eq!(config.delay_for(2), Duration::from_secs(49));
    }

    #[test]
    fn delays_saturate_instead_of_overflowing() {
        let config = RetryConfig {
            attempts: u32::MAX,
            exp_base: u32::MAX,
            initial_delay_ms: u64::MAX,
        };
        // Absurd configuration still yields a finite duration.
        let _ = config.delay_for(u32::MAX);
    }
}
