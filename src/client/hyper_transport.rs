// src/client/hyper_transport.rs
//! Default plain-HTTP transport
//!
//! A thin `HttpClient` over the hyper legacy client. Good enough for the
//! record run of a test suite talking to a local or plain-HTTP service;
//! anything needing TLS or connection tuning should inject its own
//! implementation at the same seam.

use crate::client::{Headers, HttpClient, HttpRequest, HttpResponse};
use crate::utils::errors::{EngineError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

/// Plain-HTTP implementation of the client capability
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    /// Create a transport with default connection settings
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for HyperTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("sending {} {}", request.method, request.url);

        let mut builder = hyper::Request::builder()
            .method(request.method.as_str())
            .uri(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let body = request.body.unwrap_or_default();
        let outbound = builder
            .body(Full::new(body))
            .map_err(|e| EngineError::transport(e.to_string()))?;

        let response = self
            .client
            .request(outbound)
            .await
            .map_err(|e| EngineError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let (parts, body) = response.into_parts();

        let mut headers = Headers::new();
        for (name, value) in &parts.headers {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        let body_bytes = body
            .collect()
            .await
            .map_err(|e| EngineError::transport(e.to_string()))?
            .to_bytes();
        let body = if body_bytes.is_empty() {
            None
        } else {
            Some(body_bytes)
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
