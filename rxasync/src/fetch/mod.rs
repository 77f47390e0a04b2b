//! Fetch requests as an [`AsyncStateHandle`].
//!
//! [`use_fetch`] builds the operation from a request URL or descriptor and
//! its init options, sends it through a [`Transport`] with the attempt's
//! cancellation signal attached, and re-fetches whenever either input cell
//! changes. Loading, data, error, abort and retry are those of the returned
//! handle.
//!
//! The response is interpreted per attempt, using the init value current at
//! call time:
//!
//! * a non-2xx status fails with [`FetchError::Status`] carrying the raw
//!   response;
//! * `Accept: application/json` in the init headers yields
//!   [`FetchBody::Json`];
//! * anything else yields [`FetchBody::Text`].

mod error;
mod mock;
mod request;
mod response;
mod transport;

pub use error::*;
pub use mock::*;
pub use request::*;
pub use response::*;
pub use transport::*;

use crate::{AsyncOptions, AsyncStateHandle, Input, Operation, ViewScope};
use futures::{FutureExt, StreamExt};
use futures_signals::signal::{Mutable, SignalExt};
use std::sync::Arc;
use tracing::debug;

pub type FetchHandle = AsyncStateHandle<FetchBody, (), FetchError>;

pub fn use_fetch(
    scope: &ViewScope,
    transport: Arc<dyn Transport>,
    info: Input<RequestInfo>,
    init: Input<RequestInit>,
) -> FetchHandle {
    use_fetch_with(scope, transport, info, init, AsyncOptions::default())
}

/// Fetch a URL with default init options.
pub fn use_fetch_url(
    scope: &ViewScope,
    transport: Arc<dyn Transport>,
    url: impl Into<String>,
) -> FetchHandle {
    use_fetch(
        scope,
        transport,
        Input::constant(RequestInfo::Url(url.into())),
        Input::default(),
    )
}

pub fn use_fetch_with(
    scope: &ViewScope,
    transport: Arc<dyn Transport>,
    info: Input<RequestInfo>,
    init: Input<RequestInit>,
    options: AsyncOptions,
) -> FetchHandle {
    let info = info.into_cell();
    let init = init.into_cell();

    let operation = fetch_operation(transport, info.clone(), init.clone());
    let handle = AsyncStateHandle::with_options(
        scope,
        Input::constant(operation),
        Input::constant(()),
        options,
    );

    // The handle has already fetched the current request; swallow the
    // matching first emission so creation costs exactly one attempt.
    let mut changes = Box::pin(crate::watch_inputs!(info, init).to_stream());
    let initial = changes.next().now_or_never();
    debug_assert!(
        matches!(initial, Some(Some(_))),
        "request cells must emit their current value immediately"
    );

    let weak = handle.downgrade();
    let bridge = tokio::spawn(async move {
        while changes.next().await.is_some() {
            let Some(handle) = weak.upgrade() else {
                break;
            };
            debug!("Fetch | request changed, fetching again");
            handle.retry();
        }
    });
    scope.on_unmount(move || bridge.abort());

    handle
}

fn fetch_operation(
    transport: Arc<dyn Transport>,
    info: Mutable<RequestInfo>,
    init: Mutable<RequestInit>,
) -> Operation<FetchBody, (), FetchError> {
    Operation::new(move |(), signal| {
        let transport = transport.clone();
        let init = init.get_cloned();
        let request = FetchRequest::new(&info.lock_ref(), &init);
        async move {
            let response = transport.fetch(request, signal).await?;
            interpret(response, &init)
        }
    })
}

/// Turn a response into the settled value of an attempt.
pub fn interpret(response: FetchResponse, init: &RequestInit) -> Result<FetchBody, FetchError> {
    if !response.ok() {
        return Err(FetchError::Status(response));
    }
    if init.accepts_json() {
        response.json().map(FetchBody::Json)
    } else {
        Ok(FetchBody::Text(response.text()))
    }
}
