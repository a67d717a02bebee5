//! Composes the four resilience primitives into one envelope (spec §4.3).
//!
//! Evaluation order is fixed innermost-to-outermost: timeout, then circuit
//! breaker, then bulkhead, then retry — so each retried attempt is
//! individually time-bounded, gated by the shared breaker, and admitted
//! through the shared bulkhead before the outermost retry loop decides
//! whether to try again.

use std::time::Duration;

use super::bulkhead::{Bulkhead, BulkheadConfig, BulkheadError};
use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitOutcome};
use super::retry::{retry_with_backoff, RetryConfig};
use super::timeout::{timeout, TimeoutError};

#[derive(Debug, Clone)]
pub struct ResilientExecutorConfig {
    pub timeout: Duration,
    pub circuit_breaker: CircuitBreakerConfig,
    pub bulkhead: BulkheadConfig,
    pub retry: RetryConfig,
}

impl Default for ResilientExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            circuit_breaker: CircuitBreakerConfig::default(),
            bulkhead: BulkheadConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Error surfaced by the envelope, classified per spec §7.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError<E> {
    #[error("timed out")]
    Timeout,
    #[error("circuit open")]
    CircuitOpen,
    #[error("bulkhead rejected")]
    BulkheadRejected,
    #[error(transparent)]
    Inner(E),
}

/// A named resilience envelope protecting one external resource (e.g. the
/// LLM endpoint, shared process-wide per spec §5).
pub struct ResilientExecutor {
    breaker: CircuitBreaker,
    bulkhead: Bulkhead,
    config: ResilientExecutorConfig,
}

impl ResilientExecutor {
    pub fn new(name: impl Into<String>, config: ResilientExecutorConfig) -> Self {
        let name = name.into();
        Self {
            breaker: CircuitBreaker::new(name, config.circuit_breaker.clone()),
            bulkhead: Bulkhead::new(config.bulkhead.clone()),
            config,
        }
    }

    /// Run `op`, retried at the outermost layer. `op` is re-invoked by value
    /// on each attempt, so callers typically close over an `Arc`-wrapped
    /// client rather than unique resources.
    pub async fn call<F, Fut, T, E>(&self, is_transient: impl Fn(&E) -> bool, mut op: F) -> Result<T, EnvelopeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let timeout_dur = self.config.timeout;
        let bulkhead = &self.bulkhead;
        let breaker = &self.breaker;
        let result = retry_with_backoff(
            &self.config.retry,
            |e: &EnvelopeError<E>| matches!(e, EnvelopeError::Timeout) || matches!(e, EnvelopeError::Inner(inner) if is_transient(inner)),
            async || {
                let bulkhead_result = bulkhead
                    .run(|| async {
                        breaker
                            .call(|| async { timeout(timeout_dur, op()).await.map_err(|_| TimeoutError(timeout_dur)) })
                            .await
                    })
                    .await;

                match bulkhead_result {
                    Err(BulkheadError(_)) => Err(EnvelopeError::BulkheadRejected),
                    Ok(Err(CircuitOutcome::Open(_))) => Err(EnvelopeError::CircuitOpen),
                    Ok(Err(CircuitOutcome::Inner(TimeoutError(_)))) => Err(EnvelopeError::Timeout),
                    Ok(Ok(Err(e))) => Err(EnvelopeError::Inner(e)),
                    Ok(Ok(Ok(v))) => Ok(v),
                }
            },
        )
        .await;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn successful_call_returns_value() {
        let exec = ResilientExecutor::new("svc", ResilientExecutorConfig::default());
        let result = exec
            .call(|_: &&str| true, || async { Ok::<_, &str>(5) })
            .await;
        assert!(matches!(result, Ok(5)));
    }

    #[tokio::test]
    async fn non_transient_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let exec = ResilientExecutor::new("svc", ResilientExecutorConfig::default());
        let result = exec
            .call(|_: &&str| false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>("permanent") }
            })
            .await;
        assert!(matches!(result, Err(EnvelopeError::Inner("permanent"))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_error_retried_then_opens_breaker() {
        let config = ResilientExecutorConfig {
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 2,
                success_threshold: 1,
                open_timeout: Duration::from_secs(30),
                reset_window: Duration::from_secs(60),
            },
            retry: RetryConfig {
                max_attempts: 5,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(4),
                ..RetryConfig::default()
            },
            ..ResilientExecutorConfig::default()
        };
        let calls = AtomicU32::new(0);
        let exec = ResilientExecutor::new("svc", config);
        let result = exec
            .call(|_: &&str| true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>("boom") }
            })
            .await;
        assert!(result.is_err());
        // After 2 failures the breaker opens; later attempts fail fast via CircuitOpen
        // rather than invoking the operation, so total calls stay below max_attempts.
        assert!(calls.load(Ordering::SeqCst) <= 3);
    }
}
