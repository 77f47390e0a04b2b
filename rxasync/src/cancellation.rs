use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Owning side of one attempt's cancellation.
///
/// Held exclusively by the [`AsyncStateHandle`](crate::AsyncStateHandle)
/// that created it, for the lifetime of a single attempt.
#[derive(Debug, Default)]
pub struct CancellationHandle {
    token: CancellationToken,
}

impl CancellationHandle {
    pub fn new() -> Self {
        CancellationHandle {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. Calling it more than once has no further effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Observer side handed to the operation function.
    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            token: self.token.child_token(),
        }
    }
}

/// Read-only view on a [`CancellationHandle`].
///
/// Operations may poll it or await [`CancellationSignal::cancelled`] to stop
/// their own work early; they are free to ignore it.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    /// A signal that never fires, for calls made outside any attempt.
    pub fn never() -> Self {
        CancellationSignal {
            token: CancellationToken::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
