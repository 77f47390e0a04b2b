use crate::{CancellationSignal, Operation};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

mod async_state_test;

struct Call<P, T, E> {
    params: P,
    signal: CancellationSignal,
    sender: Option<oneshot::Sender<Result<T, E>>>,
}

/// An operation whose attempts settle only when the test says so.
pub struct Controlled<P, T, E> {
    calls: Arc<Mutex<Vec<Call<P, T, E>>>>,
}

impl<P, T, E> Controlled<P, T, E>
where
    P: Clone + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new() -> Self {
        Controlled {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn operation(&self) -> Operation<T, P, E> {
        let calls = self.calls.clone();
        Operation::new(move |params, signal| {
            let (sender, receiver) = oneshot::channel();
            calls.lock().unwrap().push(Call {
                params,
                signal,
                sender: Some(sender),
            });
            async move {
                match receiver.await {
                    Ok(result) => result,
                    Err(_) => futures::future::pending().await,
                }
            }
        })
    }

    pub fn settle(&self, index: usize, result: Result<T, E>) {
        let sender = self.calls.lock().unwrap()[index].sender.take();
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn params(&self, index: usize) -> P {
        self.calls.lock().unwrap()[index].params.clone()
    }

    pub fn signal(&self, index: usize) -> CancellationSignal {
        self.calls.lock().unwrap()[index].signal.clone()
    }
}

/// Let spawned tasks run until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

/// Give every spawned task a chance to run.
pub async fn flush() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
