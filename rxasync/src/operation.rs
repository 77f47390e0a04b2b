use crate::CancellationSignal;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type OperationFn<T, P, E> =
    dyn Fn(P, CancellationSignal) -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// A unit of asynchronous work: `(params, signal) -> Future<Result<T, E>>`.
///
/// Cheap to clone; clones share identity (see [`Operation::same`]).
pub struct Operation<T, P, E> {
    inner: Arc<OperationFn<T, P, E>>,
}

impl<T, P, E> Operation<T, P, E>
where
    T: Send + 'static,
    P: 'static,
    E: Send + 'static,
{
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(P, CancellationSignal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Operation {
            inner: Arc::new(move |params, signal| f(params, signal).boxed()),
        }
    }

    /// An operation that ignores its parameters and the cancellation signal.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Operation::new(move |_, _| f())
    }
}

impl<T, P, E> Operation<T, P, E> {
    /// Start the work. The returned future is inert until polled.
    pub fn call(&self, params: P, signal: CancellationSignal) -> BoxFuture<'static, Result<T, E>> {
        (self.inner)(params, signal)
    }

    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, P, E> Clone for Operation<T, P, E> {
    fn clone(&self) -> Self {
        Operation {
            inner: self.inner.clone(),
        }
    }
}

impl<T, P, E> fmt::Debug for Operation<T, P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn call_passes_params() {
        let double = Operation::<i32, i32, String>::new(|n, _| async move { Ok(n * 2) });
        assert_eq!(double.call(21, CancellationSignal::never()).await, Ok(42));
    }

    #[test]
    fn clones_share_identity() {
        let op = Operation::<(), (), ()>::from_fn(|| async { Ok(()) });
        let other = Operation::<(), (), ()>::from_fn(|| async { Ok(()) });
        assert!(op.same(&op.clone()));
        assert!(!op.same(&other));
    }
}
