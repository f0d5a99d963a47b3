//! Request Coalescer
//!
//! Collapses concurrent requests for the same key into one in-flight operation.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, SearchError};

type PendingRequest<T> = Shared<BoxFuture<'static, Result<T>>>;

// == Request Coalescer ==
/// Guarantees at most one in-flight operation per key.
///
/// Callers arriving while an operation is pending join it and observe the same
/// outcome, success or failure. Operations run on their own task, so they
/// settle and unregister even when no caller is left awaiting them. The
/// pending entry is removed before any caller sees the result, so a call made
/// after settlement always starts a fresh operation.
pub struct RequestCoalescer<T> {
    pending: Arc<Mutex<HashMap<String, PendingRequest<T>>>>,
}

impl<T> Clone for RequestCoalescer<T> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> Default for RequestCoalescer<T> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T> RequestCoalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    // == Coalesce ==
    /// Runs `operation` for `key`, or joins the one already running.
    ///
    /// `operation` is only invoked when no request for `key` is pending.
    pub async fn coalesce<F, Fut>(&self, key: &str, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let request = {
            let mut pending = self.pending.lock().await;

            match pending.get(key) {
                Some(existing) => {
                    debug!(key, "Joining in-flight request");
                    existing.clone()
                }
                None => {
                    let request = self.start(key.to_string(), operation());
                    pending.insert(key.to_string(), request.clone());
                    request
                }
            }
        };

        request.await
    }

    /// Spawns `operation` so it settles even if every caller walks away.
    ///
    /// The task unregisters `key` before its outcome becomes visible. A panic
    /// or runtime shutdown surfaces as a `Transport` error to the waiters.
    fn start<Fut>(&self, key: String, operation: Fut) -> PendingRequest<T>
    where
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let pending = Arc::clone(&self.pending);

        let task = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(operation).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => Err(SearchError::transport("request task panicked")),
            };
            pending.lock().await.remove(&key);
            debug!(key = %key, ok = outcome.is_ok(), "In-flight request settled");
            outcome
        });

        async move {
            task.await.unwrap_or_else(|err| {
                Err(SearchError::transport(format!("request task failed: {err}")))
            })
        }
        .boxed()
        .shared()
    }

    // == In Flight ==
    /// Number of keys with a pending operation.
    pub async fn in_flight(&self) -> usize {
        self.pending.lock().await.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counted(
        calls: &Arc<AtomicUsize>,
        delay_ms: u64,
        outcome: Result<u32>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                outcome
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_share_one_operation() {
        let coalescer = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            coalescer.coalesce("x", counted(&calls, 100, Ok(7))),
            coalescer.coalesce("x", counted(&calls, 100, Ok(8))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_after_settlement_starts_fresh() {
        let coalescer = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = coalescer.coalesce("x", counted(&calls, 10, Ok(1))).await;
        let second = coalescer.coalesce("x", counted(&calls, 10, Ok(2))).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_shared_and_retry_is_fresh() {
        let coalescer = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = SearchError::transport("backend down");

        let (a, b) = tokio::join!(
            coalescer.coalesce("x", counted(&calls, 50, Err(failure.clone()))),
            coalescer.coalesce("x", counted(&calls, 50, Ok(1))),
        );

        assert_eq!(a, Err(failure.clone()));
        assert_eq!(b, Err(failure));
        assert_eq!(coalescer.in_flight().await, 0);

        let retry = coalescer.coalesce("x", counted(&calls, 5, Ok(3))).await;
        assert_eq!(retry, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_removed_before_result_is_delivered() {
        let coalescer = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let probe = coalescer.clone();
        let in_flight_after = coalescer
            .coalesce("x", counted(&calls, 10, Ok(1)))
            .then(|_| async move { probe.in_flight().await })
            .await;

        assert_eq!(in_flight_after, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_run_independently() {
        let coalescer = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            coalescer.coalesce("a", counted(&calls, 20, Ok(1))),
            coalescer.coalesce("b", counted(&calls, 20, Ok(2))),
        );

        assert_eq!((a, b), (Ok(1), Ok(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_tracks_pending_keys() {
        let coalescer = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let background = coalescer.clone();
        let task_calls = Arc::clone(&calls);
        let handle = tokio::spawn(async move {
            background
                .coalesce("slow", counted(&task_calls, 1_000, Ok(9)))
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(coalescer.in_flight().await, 1);

        assert_eq!(handle.await.unwrap(), Ok(9));
        assert_eq!(coalescer.in_flight().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_operation_still_settles() {
        let coalescer = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        // The only caller gives up long before the operation finishes
        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            coalescer.coalesce("x", counted(&calls, 1_000, Ok(1))),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(coalescer.in_flight().await, 1);

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(coalescer.in_flight().await, 0);

        let next = coalescer.coalesce("x", counted(&calls, 10, Ok(2))).await;
        assert_eq!(next, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_operation_reports_transport_error() {
        let coalescer: RequestCoalescer<u32> = RequestCoalescer::new();

        async fn explode() -> Result<u32> {
            panic!("backend client bug")
        }

        let outcome = coalescer.coalesce("boom", explode).await;

        assert!(matches!(outcome, Err(SearchError::Transport { .. })));
        assert_eq!(coalescer.in_flight().await, 0);
    }

    #[test]
    fn test_many_threads_single_invocation() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();
        let coalescer: RequestCoalescer<u32> = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let results = rt.block_on(async {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let coalescer = coalescer.clone();
                    let op = counted(&calls, 200, Ok(42));
                    tokio::spawn(async move { coalescer.coalesce("hot", op).await })
                })
                .collect();

            let mut results = Vec::new();
            for handle in handles {
                results.push(handle.await.expect("Task should not panic"));
            }
            results
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| *r == Ok(42)));
    }
}
