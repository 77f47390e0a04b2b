use crate::fetch::{FetchError, Headers};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fully received response.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FetchResponse {
    pub status: u16,
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        FetchResponse {
            status,
            body: body.into(),
            ..FetchResponse::default()
        }
    }

    /// Status in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        self.body.clone()
    }

    pub fn json(&self) -> Result<serde_json::Value, FetchError> {
        serde_json::from_str(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// The settled value of a fetch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FetchBody {
    Json(serde_json::Value),
    Text(String),
}

impl FetchBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            FetchBody::Json(value) => Some(value),
            FetchBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FetchBody::Text(text) => Some(text),
            FetchBody::Json(_) => None,
        }
    }
}
