//! Bulkhead: bounded concurrency plus a bounded wait queue (spec §4.3).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bulkhead rejected: queue full ({0} waiting)")]
pub struct BulkheadError(pub usize);

#[derive(Debug, Clone)]
pub struct BulkheadConfig {
    pub max_concurrent: usize,
    pub max_queue: usize,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            max_queue: 50,
        }
    }
}

/// Admits up to `max_concurrent` operations, queues up to `max_queue` more
/// (FIFO via the semaphore's fair wait list), and rejects further arrivals.
pub struct Bulkhead {
    semaphore: Arc<Semaphore>,
    max_queue: usize,
    waiting: AtomicUsize,
}

impl Bulkhead {
    pub fn new(config: BulkheadConfig) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            max_queue: config.max_queue,
            waiting: AtomicUsize::new(0),
        }
    }

    /// Current number of callers queued behind the concurrency limit.
    pub fn queue_len(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Run `op` inside the bulkhead, rejecting immediately if the queue is
    /// already at capacity.
    pub async fn run<F, Fut, T>(&self, op: F) -> Result<T, BulkheadError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let queued = self.waiting.fetch_add(1, Ordering::SeqCst);
        if queued >= self.max_queue {
            self.waiting.fetch_sub(1, Ordering::SeqCst);
            return Err(BulkheadError(queued));
        }

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("bulkhead semaphore closed");
        self.waiting.fetch_sub(1, Ordering::SeqCst);

        let result = op().await;
        drop(permit);
        Ok(result)
    }
}
