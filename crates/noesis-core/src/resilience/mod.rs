//! Composable resilience primitives protecting external calls (spec §4.3):
//! circuit breaker, bulkhead, timeout, and retry with exponential backoff.

mod bulkhead;
mod circuit_breaker;
mod executor;
mod retry;
mod timeout;

pub use bulkhead::{Bulkhead, BulkheadConfig, BulkheadError};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitError, CircuitState};
pub use executor::{EnvelopeError, ResilientExecutor, ResilientExecutorConfig};
pub use retry::{retry_with_backoff, RetryConfig};
pub use timeout::{timeout, TimeoutError};
