use crate::fetch::{FetchError, FetchRequest, FetchResponse, Transport};
use crate::CancellationSignal;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// In-memory [`Transport`] for tests and demos.
///
/// Answers with queued results first, then with the fallback. Every request
/// is recorded together with the cancellation signal it was sent with. While
/// held, requests wait until released or cancelled.
pub struct MockTransport {
    queued: Mutex<VecDeque<Result<FetchResponse, FetchError>>>,
    fallback: Mutex<Result<FetchResponse, FetchError>>,
    requests: Mutex<Vec<(FetchRequest, CancellationSignal)>>,
    gate: watch::Sender<bool>,
    delay: Option<Duration>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new(fallback: FetchResponse) -> Self {
        MockTransport {
            queued: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Ok(fallback)),
            requests: Mutex::new(Vec::new()),
            gate: watch::Sender::new(true),
            delay: None,
        }
    }

    /// Answer every request after `delay`.
    pub fn with_delay(self, delay: Duration) -> Self {
        MockTransport {
            delay: Some(delay),
            ..self
        }
    }

    /// Answer the next request with `result`, once.
    pub fn push(&self, result: Result<FetchResponse, FetchError>) {
        locked(&self.queued).push_back(result);
    }

    pub fn set_fallback(&self, result: Result<FetchResponse, FetchError>) {
        *locked(&self.fallback) = result;
    }

    /// Make new and pending requests wait for [`MockTransport::release`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        locked(&self.requests)
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    /// Cancellation signal of the `index`-th request.
    pub fn signal(&self, index: usize) -> Option<CancellationSignal> {
        locked(&self.requests)
            .get(index)
            .map(|(_, signal)| signal.clone())
    }

    pub fn call_count(&self) -> usize {
        locked(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<FetchRequest> {
        locked(&self.requests)
            .last()
            .map(|(request, _)| request.clone())
    }

    async fn respond(&self) -> Result<FetchResponse, FetchError> {
        let mut gate = self.gate.subscribe();
        let opened = gate.wait_for(|open| *open).await.is_ok();
        if !opened {
            return Err(FetchError::Transport("mock transport dropped".to_string()));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let queued = locked(&self.queued).pop_front();
        queued.unwrap_or_else(|| locked(&self.fallback).clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(
        &self,
        request: FetchRequest,
        signal: CancellationSignal,
    ) -> Result<FetchResponse, FetchError> {
        locked(&self.requests).push((request, signal.clone()));
        tokio::select! {
            biased;
            _ = signal.cancelled() => Err(FetchError::Cancelled),
            result = self.respond() => result,
        }
    }
}
