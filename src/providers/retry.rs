// Retry logic with exponential backoff

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;

const BASE_DELAY_MS: u64 = 1000;

/// How often (and how patiently) to repeat a failed provider call
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 means call once
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }

    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::once()
        }
    }

    /// Delay before attempt `attempt + 1` (1-based `attempt`)
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

/// Execute a function with exponential backoff retry logic
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "Request failed (attempt {}/{}), retrying in {:?}: {:#}",
                    attempt,
                    max_attempts,
                    delay,
                    e
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_single_attempt_returns_first_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::once(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::attempts(3), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                anyhow::bail!("transient")
            }
            Ok(n)
        })
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::attempts(2), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("still down")
        })
        .await;

        assert!(result.unwrap_err().to_string().contains("still down"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::attempts(4);
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_zero_attempts_means_once() {
        assert_eq!(RetryPolicy::attempts(0).max_attempts, 1);
    }
}
