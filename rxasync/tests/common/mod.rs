#![allow(dead_code)]

use rxasync::fetch::{FetchResponse, MockTransport};
use rxasync::Operation;
use std::sync::Arc;
use std::time::Duration;

pub const URL: &str = "http://x";

pub fn json_transport() -> Arc<MockTransport> {
    Arc::new(MockTransport::new(FetchResponse::new(200, r#"{"success":true}"#)))
}

/// Resolves to `value` after `millis`.
pub fn delayed(value: &'static str, millis: u64) -> Operation<String, (), String> {
    Operation::from_fn(move || async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(value.to_string())
    })
}

/// Echoes its params after `millis`.
pub fn echo(millis: u64) -> Operation<u64, u64, String> {
    Operation::new(move |params, _| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(params)
    })
}
