//! Scoped performance instrumentation (spec §4.2).

use std::future::Future;
use std::time::Instant;

use super::logger::Logger;

/// Run `op`, logging its wall-clock duration at `info` (and escalating to
/// `warn` when it exceeds `slow_threshold_ms`). The original outcome is
/// returned unchanged — `measure` never alters control flow.
pub async fn measure<F, Fut, T>(logger: &Logger, name: &str, slow_threshold_ms: u64, op: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let start = Instant::now();
    let result = op().await;
    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_millis();

    let message = format!("{name} completed in {elapsed_ms}ms");
    if elapsed_ms as u64 > slow_threshold_ms {
        logger.warn(&format!("{message} (slow, threshold {slow_threshold_ms}ms)"));
    } else {
        logger.info(&message);
    }

    result
}
