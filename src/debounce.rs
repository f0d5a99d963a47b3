//! Debounce Module
//!
//! Collapses bursts of calls into a single execution of the last one.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::trace;

// == Debounce State ==
#[derive(Debug)]
enum DebounceState {
    Idle,
    /// A timer is armed; `generation` identifies the call that armed it
    Pending {
        generation: u64,
        timer: JoinHandle<()>,
    },
}

#[derive(Debug)]
struct DebounceInner {
    generation: u64,
    state: DebounceState,
}

// == Debouncer ==
/// Wraps an async function so that only the last call of a burst runs it.
///
/// Each call disarms the pending timer, if any, and arms a new one for `delay`.
/// When a timer fires the wrapped function is launched with that call's
/// arguments; a launched execution is never cancelled by later calls.
///
/// Must be used from within a tokio runtime.
pub struct Debouncer<A, F> {
    delay: Duration,
    func: Arc<F>,
    inner: Arc<Mutex<DebounceInner>>,
    _args: PhantomData<fn(A)>,
}

impl<A, F, Fut> Debouncer<A, F>
where
    A: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    pub fn new(delay: Duration, func: F) -> Self {
        Self {
            delay,
            func: Arc::new(func),
            inner: Arc::new(Mutex::new(DebounceInner {
                generation: 0,
                state: DebounceState::Idle,
            })),
            _args: PhantomData,
        }
    }

    // == Call ==
    /// Schedules `func(args)` after the debounce delay, superseding any pending call.
    ///
    /// The receiver yields the function's output, or a `RecvError` if this call
    /// was superseded or cancelled before its timer fired.
    pub fn call(&self, args: A) -> oneshot::Receiver<Fut::Output> {
        let (tx, rx) = oneshot::channel();
        let mut inner = lock(&self.inner);

        disarm(&mut inner);
        inner.generation += 1;
        let generation = inner.generation;

        let shared = Arc::clone(&self.inner);
        let func = Arc::clone(&self.func);
        let delay = self.delay;

        // The lock is held until the new state is stored, so the timer cannot
        // observe the state before it is armed.
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut inner = lock(&shared);
                let current = matches!(
                    inner.state,
                    DebounceState::Pending { generation: armed, .. } if armed == generation
                );
                if !current {
                    return;
                }
                inner.state = DebounceState::Idle;
            }

            trace!(generation, "Debounce timer fired");
            let _ = tx.send(func(args).await);
        });

        inner.state = DebounceState::Pending { generation, timer };
        rx
    }
}

impl<A, F> Debouncer<A, F> {
    /// Disarms the pending timer without running anything.
    pub fn cancel(&self) {
        disarm(&mut lock(&self.inner));
    }

    /// Whether a timer is currently armed.
    pub fn is_pending(&self) -> bool {
        matches!(lock(&self.inner).state, DebounceState::Pending { .. })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<A, F> Drop for Debouncer<A, F> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn disarm(inner: &mut DebounceInner) {
    if let DebounceState::Pending { timer, .. } =
        std::mem::replace(&mut inner.state, DebounceState::Idle)
    {
        timer.abort();
        trace!("Debounce timer disarmed");
    }
}

fn lock(inner: &Mutex<DebounceInner>) -> MutexGuard<'_, DebounceInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
