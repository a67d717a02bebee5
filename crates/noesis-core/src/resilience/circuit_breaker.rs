//! Circuit breaker with closed/open/half-open states (spec §4.3).

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::info;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Rejection reported while the breaker is open.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("circuit open: {0}")]
pub struct CircuitError(pub String);

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_timeout: Duration,
    pub reset_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 2,
            open_timeout: Duration::from_secs(30),
            reset_window: Duration::from_secs(60),
        }
    }
}

struct Inner {
    state: CircuitState,
    failures: Vec<Instant>,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// A circuit breaker guarding a single protected resource (e.g. one LLM
/// endpoint). Cheap to clone via `Arc` at the call site; internally
/// single-writer via a `Mutex`, matching the teacher's
/// `Mutex<rusqlite::Connection>` discipline for shared mutable state.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failures: Vec::new(),
                consecutive_successes: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().expect("circuit breaker lock poisoned").state
    }

    /// Decide whether a call may proceed, transitioning open -> half-open
    /// when `open_timeout` has elapsed. Only one trial is admitted while
    /// half-open; concurrent callers racing the trial are rejected.
    fn admit(&self) -> Result<(), CircuitError> {
        let mut inner = self.inner.lock().expect("circuit breaker lock poisoned");
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    Err(CircuitError(format!("{} trial already in flight", self.name)))
                } else {
                    inner.trial_in_flight = true;
                    Ok(())
                }
            }
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.config.open_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.consecutive_successes = 0;
                    inner.trial_in_flight = true;
                    info!(circuit = %self.name, "circuit half-open after {:?}", elapsed);
                    Ok(())
                } else {
                    Err(CircuitError(format!("{} is open", self.name)))
                }
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker lock poisoned");
        match inner.state {
            CircuitState::Closed => {
                inner.failures.clear();
            }
            CircuitState::HalfOpen => {
                inner.trial_in_flight = false;
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures.clear();
                    inner.consecutive_successes = 0;
                    inner.opened_at = None;
                    info!(circuit = %self.name, "circuit closed");
                }
            }
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker lock poisoned");
        let now = Instant::now();
        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                inner.consecutive_successes = 0;
                inner.trial_in_flight = false;
                info!(circuit = %self.name, "circuit re-opened after half-open trial failure");
            }
            CircuitState::Closed => {
                let window = self.config.reset_window;
                inner.failures.retain(|t| now.duration_since(*t) <= window);
                inner.failures.push(now);
                if inner.failures.len() as u32 >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                    inner.failures.clear();
                    info!(circuit = %self.name, "circuit opened after {} failures", self.config.failure_threshold);
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Run `op` under the breaker: rejects immediately when open, otherwise
    /// executes `op` and updates state from the outcome.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> Result<T, CircuitOutcome<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        self.admit().map_err(CircuitOutcome::Open)?;
        match op().await {
            Ok(v) => {
                self.record_success();
                Ok(v)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitOutcome::Inner(e))
            }
        }
    }
}

/// Outcome of a call made through a [`CircuitBreaker`].
#[derive(Debug)]
pub enum CircuitOutcome<E> {
    Open(CircuitError),
    Inner(E),
}
