// src/client/mod.rs
//! Abstract HTTP client capability
//!
//! Everything in the engine speaks through one seam: an async `send` taking
//! a request value and returning a response value. The recorder and the
//! replayer both implement and consume this trait, so either can stand in
//! for the real transport in a test suite.
//!
//! - **HttpClient**: the capability trait
//! - **HttpRequest / HttpResponse**: plain value types shared with storage
//! - **HyperTransport**: default plain-HTTP implementation

use crate::utils::errors::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

pub mod hyper_transport;

pub use hyper_transport::HyperTransport;

/// Header name to value mapping
///
/// Ordered so persisted documents are stable across runs.
pub type Headers = BTreeMap<String, String>;

/// An outbound HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method, e.g. "GET"
    pub method: String,

    /// Absolute request URL
    pub url: String,

    /// Request headers
    pub headers: Headers,

    /// Request body, if any
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request with an arbitrary method
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// Attach a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a raw body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a JSON body and matching content type
    pub fn with_json_body(self, value: &serde_json::Value) -> Self {
        let bytes = serde_json::to_vec(value).expect("serde_json::Value always serializes");
        self.with_header("content-type", "application/json")
            .with_body(bytes)
    }

    /// The URL path component, used to derive transaction slugs
    ///
    /// Falls back to the full URL when it does not parse as a URI.
    pub fn path(&self) -> String {
        match self.url.parse::<hyper::Uri>() {
            Ok(uri) => uri.path().to_string(),
            Err(_) => self.url.clone(),
        }
    }
}

/// An HTTP response as observed by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,

    /// Response headers
    pub headers: Headers,

    /// Response body, if any
    pub body: Option<Bytes>,
}

impl HttpResponse {
    /// Create a response with the given status and no headers or body
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Attach a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a raw body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a JSON body and matching content type
    pub fn with_json_body(self, value: &serde_json::Value) -> Self {
        let bytes = serde_json::to_vec(value).expect("serde_json::Value always serializes");
        self.with_header("content-type", "application/json")
            .with_body(bytes)
    }
}

/// Async HTTP client capability
///
/// Implemented by the real transport, by `RecordingClient` and by
/// `ReplayClient`, which makes the three substitutable for one another.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform one HTTP call
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
