//! Retry with exponential backoff and jitter (spec §4.3).
//!
//! Jitter is drawn from a `SmallRng` seeded from `RetryConfig::jitter_seed`,
//! so retry timing stays deterministic under test while still pulling a
//! real random source for the distribution.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Seed for the deterministic jitter source.
    pub jitter_seed: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            jitter_seed: 0x9E37_79B9_7F4A_7C15,
        }
    }
}

fn backoff_delay(attempt: u32, config: &RetryConfig, rng: &mut SmallRng) -> Duration {
    let exp = config.base_delay.as_millis() as u64 * (1u64 << attempt.min(20));
    let capped = exp.min(config.max_delay.as_millis() as u64);
    let jitter = (capped as f64 * rng.r#gen::<f64>()) as u64;
    Duration::from_millis(capped / 2 + jitter / 2)
}

/// Retry `op` up to `config.max_attempts` times, applying exponential
/// backoff with jitter between attempts. Only call this for operations
/// classified idempotent and for errors classified transient — the caller
/// decides both (spec §4.3: "not applied automatically to operations
/// classified as non-idempotent").
pub async fn retry_with_backoff<F, T, E>(
    config: &RetryConfig,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: AsyncFnMut() -> Result<T, E>,
{
    let mut rng = SmallRng::seed_from_u64(config.jitter_seed);
    let mut last_err = None;

    for attempt in 0..config.max_attempts {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if !is_transient(&e) {
                    return Err(e);
                }
                last_err = Some(e);
                if attempt + 1 < config.max_attempts {
                    tokio::time::sleep(backoff_delay(attempt, config, &mut rng)).await;
                }
            }
        }
    }

    Err(last_err.expect("at least one attempt runs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_ok() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(
            &RetryConfig::default(),
            |_| true,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(1) }
            },
        )
        .await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_up_to_max_attempts() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            ..RetryConfig::default()
        };
        let result: Result<u32, &str> = retry_with_backoff(
            &config,
            |_| true,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("transient") }
            },
        )
        .await;
        assert_eq!(result, Err("transient"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_transient_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(
            &RetryConfig::default(),
            |_| false,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("permanent") }
            },
        )
        .await;
        assert_eq!(result, Err("permanent"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
