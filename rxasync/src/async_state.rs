use crate::{AsyncSnapshot, CancellationHandle, Input, Operation, Value, ViewScope};
use futures::{FutureExt, StreamExt};
use futures_signals::signal::{Mutable, MutableSignalCloned, Signal, SignalExt, SignalStream};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::AbortHandle;
use tracing::{debug, trace};

/// Behaviour switches for [`AsyncStateHandle`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct AsyncOptions {
    /// Keep the last settled `data`/`error` visible while a new attempt is
    /// loading. Off by default: loading clears both.
    pub retain_settled: bool,
}

impl AsyncOptions {
    pub fn retain_settled(self, retain_settled: bool) -> Self {
        AsyncOptions { retain_settled }
    }
}

struct Attempt {
    token: u64,
    handle: CancellationHandle,
}

#[derive(Default)]
struct Control {
    last_token: u64,
    active: Option<Attempt>,
    watcher: Option<AbortHandle>,
}

struct Shared<T, P, E> {
    snapshot: Mutable<AsyncSnapshot<T, E>>,
    operation: Mutable<Operation<T, P, E>>,
    params: Mutable<P>,
    control: Mutex<Control>,
    options: AsyncOptions,
}

impl<T, P, E> Shared<T, P, E>
where
    T: Value,
    P: Value,
    E: Value,
{
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Supersede whatever is in flight and start a new attempt.
    fn restart(self: &Arc<Self>, operation: Operation<T, P, E>, params: P) {
        let mut control = self.control();
        if let Some(previous) = control.active.take() {
            debug!(token = previous.token, "AsyncState | superseding attempt");
            previous.handle.cancel();
        }

        control.last_token += 1;
        let token = control.last_token;
        self.snapshot
            .lock_mut()
            .begin_loading(self.options.retain_settled);

        let handle = CancellationHandle::new();
        let signal = handle.signal();
        let cancelled = handle.signal();
        control.active = Some(Attempt { token, handle });
        drop(control);

        debug!(token, "AsyncState | attempt started");
        let computation = operation.call(params, signal);
        let shared = Arc::downgrade(self);
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancelled.cancelled() => None,
                result = computation => Some(result),
            };
            match (result, shared.upgrade()) {
                (Some(result), Some(shared)) => shared.settle(token, result),
                _ => trace!(token, "AsyncState | attempt dropped before settling"),
            }
        });
    }

    fn settle(&self, token: u64, result: Result<T, E>) {
        let mut control = self.control();
        match &control.active {
            Some(active) if active.token == token => {
                control.active = None;
                trace!(token, ok = result.is_ok(), "AsyncState | attempt settled");
                self.snapshot.set(AsyncSnapshot::settle(result));
            }
            _ => trace!(token, "AsyncState | stale result discarded"),
        }
    }

    fn abort(&self) {
        let mut control = self.control();
        {
            let mut snapshot = self.snapshot.lock_mut();
            if snapshot.is_loading {
                snapshot.end_loading();
            }
        }
        if let Some(active) = control.active.take() {
            debug!(token = active.token, "AsyncState | attempt aborted");
            active.handle.cancel();
        }
    }
}

impl<T, P, E> Drop for Shared<T, P, E> {
    fn drop(&mut self) {
        let control = self.control.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = control.active.take() {
            active.handle.cancel();
        }
        if let Some(watcher) = control.watcher.take() {
            watcher.abort();
        }
    }
}

/// Reactive loading/data/error state of one asynchronous operation.
///
/// The handle re-runs the operation whenever its operation cell or params
/// cell is replaced, and on [`retry`](AsyncStateHandle::retry). Only the most
/// recent attempt may write its outcome; older attempts are cancelled and
/// their results are dropped.
///
/// Must be created inside a tokio runtime. Clones share the same state.
pub struct AsyncStateHandle<T, P, E> {
    shared: Arc<Shared<T, P, E>>,
}

impl<T, P, E> AsyncStateHandle<T, P, E>
where
    T: Value,
    P: Value,
    E: Value,
{
    pub fn new(scope: &ViewScope, operation: Input<Operation<T, P, E>>, params: Input<P>) -> Self {
        Self::with_options(scope, operation, params, AsyncOptions::default())
    }

    /// Create the handle and run the first attempt before returning.
    ///
    /// Unmounting `scope` aborts the in-flight attempt and stops watching the
    /// input cells.
    pub fn with_options(
        scope: &ViewScope,
        operation: Input<Operation<T, P, E>>,
        params: Input<P>,
        options: AsyncOptions,
    ) -> Self {
        let shared = Arc::new(Shared {
            snapshot: Mutable::new(AsyncSnapshot::uninitialized()),
            operation: operation.into_cell(),
            params: params.into_cell(),
            control: Mutex::new(Control::default()),
            options,
        });

        // The first emission is ready immediately; consume it here so the
        // first attempt starts synchronously.
        let mut inputs = Box::pin(crate::watch_inputs!(shared.operation, shared.params).to_stream());
        if let Some(Some((operation, params))) = inputs.next().now_or_never() {
            shared.restart(operation, params);
        }

        let weak = Arc::downgrade(&shared);
        let watcher = tokio::spawn(async move {
            while let Some((operation, params)) = inputs.next().await {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                trace!("AsyncState | inputs changed");
                shared.restart(operation, params);
            }
        });
        shared.control().watcher = Some(watcher.abort_handle());

        let teardown = Arc::downgrade(&shared);
        scope.on_unmount(move || {
            watcher.abort();
            if let Some(shared) = teardown.upgrade() {
                shared.abort();
            }
        });

        AsyncStateHandle { shared }
    }

    pub fn is_loading(&self) -> bool {
        self.shared.snapshot.lock_ref().is_loading
    }

    pub fn data(&self) -> Option<T> {
        self.shared.snapshot.lock_ref().data.clone()
    }

    pub fn error(&self) -> Option<E> {
        self.shared.snapshot.lock_ref().error.clone()
    }

    pub fn snapshot(&self) -> AsyncSnapshot<T, E> {
        self.shared.snapshot.get_cloned()
    }

    pub fn signal(&self) -> MutableSignalCloned<AsyncSnapshot<T, E>> {
        self.shared.snapshot.signal_cloned()
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<AsyncSnapshot<T, E>>> {
        self.signal().to_stream()
    }

    pub fn is_loading_signal(&self) -> impl Signal<Item = bool> {
        self.shared.snapshot.signal_ref(|snapshot| snapshot.is_loading).dedupe()
    }

    pub fn data_signal(&self) -> impl Signal<Item = Option<T>> {
        self.shared.snapshot.signal_ref(|snapshot| snapshot.data.clone())
    }

    pub fn error_signal(&self) -> impl Signal<Item = Option<E>> {
        self.shared.snapshot.signal_ref(|snapshot| snapshot.error.clone())
    }

    /// Wait until the handle is not loading and return that snapshot.
    ///
    /// Yields once first so a pending change of the input cells reaches the
    /// watcher and starts its attempt. Returns as soon as nothing is in
    /// flight.
    pub async fn settled(&self) -> AsyncSnapshot<T, E> {
        tokio::task::yield_now().await;
        let mut stream = self.to_stream();
        while let Some(snapshot) = stream.next().await {
            if !snapshot.is_loading {
                return snapshot;
            }
        }
        self.snapshot()
    }

    /// Number of attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.shared.control().last_token
    }

    /// Stop loading and cancel the in-flight attempt, if any. Settled
    /// `data`/`error` are left as they are.
    pub fn abort(&self) {
        self.shared.abort();
    }

    /// Start a fresh attempt with the current operation and params.
    pub fn retry(&self) {
        let operation = self.shared.operation.get_cloned();
        let params = self.shared.params.get_cloned();
        self.shared.restart(operation, params);
    }

    /// Replace the operation. The restart happens on the input watcher.
    pub fn set_operation(&self, operation: Operation<T, P, E>) {
        self.shared.operation.set(operation);
    }

    /// Replace the params. The restart happens on the input watcher.
    pub fn set_params(&self, params: P) {
        self.shared.params.set(params);
    }

    pub fn downgrade(&self) -> WeakAsyncStateHandle<T, P, E> {
        WeakAsyncStateHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl<T, P, E> Clone for AsyncStateHandle<T, P, E> {
    fn clone(&self) -> Self {
        AsyncStateHandle {
            shared: self.shared.clone(),
        }
    }
}

impl<T, P, E> fmt::Debug for AsyncStateHandle<T, P, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncStateHandle")
            .field("snapshot", &*self.shared.snapshot.lock_ref())
            .finish()
    }
}

/// Non-owning reference to an [`AsyncStateHandle`].
pub struct WeakAsyncStateHandle<T, P, E> {
    shared: Weak<Shared<T, P, E>>,
}

impl<T, P, E> WeakAsyncStateHandle<T, P, E> {
    pub fn upgrade(&self) -> Option<AsyncStateHandle<T, P, E>> {
        self.shared.upgrade().map(|shared| AsyncStateHandle { shared })
    }
}

impl<T, P, E> Clone for WeakAsyncStateHandle<T, P, E> {
    fn clone(&self) -> Self {
        WeakAsyncStateHandle {
            shared: self.shared.clone(),
        }
    }
}

pub fn use_async<T, P, E>(
    scope: &ViewScope,
    operation: Input<Operation<T, P, E>>,
    params: Input<P>,
) -> AsyncStateHandle<T, P, E>
where
    T: Value,
    P: Value,
    E: Value,
{
    AsyncStateHandle::new(scope, operation, params)
}

pub fn use_async_with<T, P, E>(
    scope: &ViewScope,
    operation: Input<Operation<T, P, E>>,
    params: Input<P>,
    options: AsyncOptions,
) -> AsyncStateHandle<T, P, E>
where
    T: Value,
    P: Value,
    E: Value,
{
    AsyncStateHandle::with_options(scope, operation, params, options)
}
