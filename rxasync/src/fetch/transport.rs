use crate::fetch::{FetchError, FetchRequest, FetchResponse};
use crate::CancellationSignal;
use async_trait::async_trait;
use std::sync::Arc;

/// The network layer behind [`use_fetch`](crate::fetch::use_fetch).
///
/// Implementations should stop early once `signal` fires, but are not
/// required to: a late response of a cancelled attempt is discarded anyway.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn fetch(
        &self,
        request: FetchRequest,
        signal: CancellationSignal,
    ) -> Result<FetchResponse, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(
        &self,
        request: FetchRequest,
        signal: CancellationSignal,
    ) -> Result<FetchResponse, FetchError> {
        (**self).fetch(request, signal).await
    }
}

#[cfg(feature = "reqwest")]
pub use self::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod http {
    use super::*;
    use crate::fetch::{Headers, Method};

    /// [`Transport`] backed by a `reqwest` client.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            ReqwestTransport { client }
        }
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }

    impl ReqwestTransport {
        async fn send(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
            let mut builder = self.client.request(method(request.method), &request.url);
            for (name, value) in request.headers.iter() {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            let url = response.url().to_string();
            let headers: Headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            Ok(FetchResponse {
                status,
                url,
                headers,
                body,
            })
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn fetch(
            &self,
            request: FetchRequest,
            signal: CancellationSignal,
        ) -> Result<FetchResponse, FetchError> {
            tokio::select! {
                biased;
                _ = signal.cancelled() => Err(FetchError::Cancelled),
                result = self.send(request) => result,
            }
        }
    }
}
