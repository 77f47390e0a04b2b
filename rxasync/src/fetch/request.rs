#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ACCEPT: &str = "Accept";
pub const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header list with case-insensitive names. Insertion order is kept.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Headers::default()
    }

    /// Set `name`, replacing any existing value regardless of case.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `other` override entries of `self`.
    pub fn merged(&self, other: &Headers) -> Headers {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value);
        }
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// A full request description, as an alternative to a bare URL.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
}

/// First argument of a fetch: a URL or a request descriptor.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RequestInfo {
    Url(String),
    Request(RequestDescriptor),
}

impl RequestInfo {
    pub fn url(&self) -> &str {
        match self {
            RequestInfo::Url(url) => url,
            RequestInfo::Request(request) => &request.url,
        }
    }
}

impl Default for RequestInfo {
    fn default() -> Self {
        RequestInfo::Url(String::new())
    }
}

impl From<&str> for RequestInfo {
    fn from(url: &str) -> Self {
        RequestInfo::Url(url.to_string())
    }
}

impl From<String> for RequestInfo {
    fn from(url: String) -> Self {
        RequestInfo::Url(url)
    }
}

impl From<RequestDescriptor> for RequestInfo {
    fn from(request: RequestDescriptor) -> Self {
        RequestInfo::Request(request)
    }
}

/// Options of a fetch. Anything set here wins over the [`RequestInfo`].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RequestInit {
    pub method: Option<Method>,
    pub headers: Headers,
    pub body: Option<String>,
}

impl RequestInit {
    pub fn new() -> Self {
        RequestInit::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// `Accept: application/json` is set.
    pub fn accepts_json(&self) -> bool {
        self.headers.get(ACCEPT) == Some(APPLICATION_JSON)
    }
}

/// What a [`Transport`](crate::fetch::Transport) actually sends.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn new(info: &RequestInfo, init: &RequestInit) -> Self {
        let (url, method, headers) = match info {
            RequestInfo::Url(url) => (url.clone(), Method::default(), Headers::new()),
            RequestInfo::Request(request) => (
                request.url.clone(),
                request.method,
                request.headers.clone(),
            ),
        };
        FetchRequest {
            url,
            method: init.method.unwrap_or(method),
            headers: headers.merged(&init.headers),
            body: init.body.clone(),
        }
    }
}
