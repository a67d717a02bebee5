//! Asynchronous-task-local trace correlation.
//!
//! A trace id is generated once at an entry point and inherited by every
//! child task spawned within `with_new_trace`'s scope, including across
//! `.await` suspension points — `tokio::task_local!` propagates through
//! `.instrument`/task-local scopes the same way the teacher propagates
//! request-scoped state through `tracing::Span`s.

use uuid::Uuid;

/// A trace correlation id, threaded through logger child contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(pub Uuid);

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

tokio::task_local! {
    static CURRENT_TRACE: TraceId;
}

/// Run `fut` with a freshly generated trace id installed as task-local state.
/// Nested calls to `with_new_trace` establish a new id for their subtree;
/// code that wants to *inherit* the caller's id should read
/// [`current_trace_id`] and pass it along explicitly instead.
pub async fn with_new_trace<F, T>(fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let id = TraceId(Uuid::new_v4());
    CURRENT_TRACE.scope(id, fut).await
}

/// The trace id of the enclosing [`with_new_trace`] scope, if any.
pub fn current_trace_id() -> Option<TraceId> {
    CURRENT_TRACE.try_with(|id| *id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trace_id_is_set_inside_scope() {
        assert!(current_trace_id().is_none());
        with_new_trace(async {
            assert!(current_trace_id().is_some());
        })
        .await;
    }

    #[tokio::test]
    async fn nested_scopes_get_distinct_ids() {
        with_new_trace(async {
            let outer = current_trace_id().unwrap();
            with_new_trace(async {
                let inner = current_trace_id().unwrap();
                assert_ne!(outer, inner);
            })
            .await;
        })
        .await;
    }
}
