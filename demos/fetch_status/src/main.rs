use crate::tracing_setup::tracing_init;
use futures_signals::signal::{Mutable, SignalExt};
use rxasync::fetch::{use_fetch, FetchResponse, MockTransport, RequestInfo, RequestInit};
use rxasync::{use_async, Input, Operation, ViewScope};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

mod tracing_setup;

#[tokio::main]
async fn main() {
    tracing_init();

    let transport = Arc::new(
        MockTransport::new(FetchResponse::new(200, r#"{"status":"green"}"#))
            .with_delay(Duration::from_millis(300)),
    );

    info!("==========================================");
    warn!("A. Fetch JSON, then switch to another URL");

    let scope = ViewScope::new();
    let info = Mutable::new(RequestInfo::from("http://status.local/api"));
    let init = RequestInit::new().header("Accept", "application/json");
    let handle = use_fetch(
        &scope,
        transport.clone(),
        Input::cell(info.clone()),
        Input::constant(init),
    );

    let view = handle.clone();
    tokio::spawn(async move {
        view.signal()
            .for_each(|snapshot| async move {
                info!("  View | render: {:?}", snapshot);
            })
            .await;
    });

    handle.settled().await;
    transport.push(Ok(FetchResponse::new(200, r#"{"status":"amber"}"#)));
    info.set(RequestInfo::from("http://status.local/api/v2"));
    sleep(Duration::from_millis(50)).await;
    let settled = handle.settled().await;
    info!("  Main | settled: {:?}", settled.data);

    info!("==========================================");
    warn!("B. Abort a slow request");

    transport.hold();
    handle.retry();
    sleep(Duration::from_millis(100)).await;
    handle.abort();
    transport.release();
    info!("  Main | after abort: {:?}", handle.snapshot());

    info!("==========================================");
    warn!("C. Retry after a failed attempt");

    let scope_c = ViewScope::new();
    let attempts = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter = attempts.clone();
    let flaky = Operation::<u64, u64, String>::new(move |base, signal| {
        let attempt = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        async move {
            sleep(Duration::from_millis(200)).await;
            if signal.is_cancelled() {
                debug!("Worker | cancelled, giving up");
            }
            if attempt == 0 {
                Err(format!("attempt {} failed", attempt))
            } else {
                Ok(base * 2)
            }
        }
    });
    let flaky_handle = use_async(&scope_c, Input::constant(flaky), Input::constant(21));
    info!("  Main | first: {:?}", flaky_handle.settled().await);
    flaky_handle.retry();
    info!("  Main | retried: {:?}", flaky_handle.settled().await);

    scope_c.unmount();
    scope.unmount();
    info!("  Main | Finish");
}
