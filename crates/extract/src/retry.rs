use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Delay before the `retry`-th retry (1-based): doubles each time, capped.
    pub fn backoff_for(&self, retry: usize) -> Duration {
        let shift = retry.saturating_sub(1).min(31) as u32;
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }

    /// Run `f` until it succeeds or the retry budget is spent.
    /// `operation` names the backend and model in every log line.
    pub async fn retry<F, Fut, T, E>(&self, operation: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut retries = 0;

        loop {
            let err = match f().await {
                Ok(value) => {
                    if retries > 0 {
                        info!(operation, retries, "Generator call recovered");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if retries >= self.max_retries {
                warn!(operation, calls = retries + 1, error = %err, "Giving up on generator call");
                return Err(err);
            }

            retries += 1;
            let delay = self.backoff_for(retries);
            warn!(
                operation,
                retry = retries,
                budget = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Generator call failed, backing off"
            );
            sleep(delay).await;
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy::new(3, 1, 2);
        let calls = AtomicUsize::new(0);

        let result: Result<usize, String> = policy
            .retry("flaky", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err("boom".to_string()) } else { Ok(n) } }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let policy = RetryPolicy::new(1, 1, 1);
        let calls = AtomicUsize::new(0);

        let result: Result<(), String> = policy
            .retry("always_fails", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope".to_string()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::new(5, 1000, 5000);

        assert_eq!(policy.backoff_for(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(4000));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(5000));
        assert_eq!(policy.backoff_for(60), Duration::from_millis(5000));
    }
}
