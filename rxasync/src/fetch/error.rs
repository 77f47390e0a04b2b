use crate::fetch::FetchResponse;
use thiserror::Error;

/// Failure value of a fetch handle.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum FetchError {
    /// The server answered with a non-2xx status. Carries the raw response
    /// so callers can inspect it.
    #[error("request failed with status {}", .0.status)]
    Status(FetchResponse),

    /// The request could not be sent or the body could not be read.
    #[error("{0}")]
    Transport(String),

    /// `Accept: application/json` was requested but the body is not JSON.
    #[error("invalid JSON body: {0}")]
    Decode(String),

    /// The transport observed the cancellation signal.
    #[error("Request was cancelled!")]
    Cancelled,
}

impl FetchError {
    pub fn is_status(&self) -> bool {
        matches!(self, FetchError::Status(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// The raw response of a [`FetchError::Status`].
    pub fn response(&self) -> Option<&FetchResponse> {
        match self {
            FetchError::Status(response) => Some(response),
            _ => None,
        }
    }
}
