// src/redaction/mod.rs
//! Sensitive-data redaction
//!
//! Two independent mechanisms run before a transaction is persisted:
//!
//! - **Redactor**: a pluggable transform over a per-side context. What to
//!   redact is policy and lives with the caller; the engine ships the
//!   identity default and a small header-placeholder policy.
//! - **ExcludedHeaders**: an explicit name list stripped from the captured
//!   headers before the transform runs and again from its output, so
//!   excluded headers never reach the transform or the disk.
//!
//! Redaction only affects what is persisted; the live call's observable
//! result is never altered.

use crate::client::{Headers, HttpRequest, HttpResponse};
use crate::transaction::TransactionSide;
use bytes::Bytes;

/// Placeholder written in place of redacted header values
pub const REDACTED_PLACEHOLDER: &str = "<redacted>";

/// Everything a redaction policy may inspect for one side of a call
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionContext {
    /// Which side of the transaction this context describes
    pub side: TransactionSide,

    /// HTTP method of the call
    pub method: String,

    /// Request URL of the call
    pub url: String,

    /// Headers of this side, already stripped of excluded names
    pub headers: Headers,

    /// Body of this side, if any
    pub body: Option<Bytes>,

    /// Status code; present on the response side only
    pub status: Option<u16>,
}

impl RedactionContext {
    /// Context for the request side of a call
    pub fn request(request: &HttpRequest, headers: Headers) -> Self {
        Self {
            side: TransactionSide::Request,
            method: request.method.clone(),
            url: request.url.clone(),
            headers,
            body: request.body.clone(),
            status: None,
        }
    }

    /// Context for the response side of a call
    pub fn response(request: &HttpRequest, response: &HttpResponse, headers: Headers) -> Self {
        Self {
            side: TransactionSide::Response,
            method: request.method.clone(),
            url: request.url.clone(),
            headers,
            body: response.body.clone(),
            status: Some(response.status),
        }
    }
}

/// Pluggable redaction transform
///
/// Takes the context by value and returns the version to persist. Pure:
/// no side effects beyond the returned value.
pub trait Redactor: Send + Sync {
    fn redact(&self, context: RedactionContext) -> RedactionContext;
}

/// Default policy: persist everything as captured
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRedactor;

impl Redactor for IdentityRedactor {
    fn redact(&self, context: RedactionContext) -> RedactionContext {
        context
    }
}

/// Replaces the values of named headers with a fixed placeholder
///
/// Header names match case-insensitively. Unlike [`ExcludedHeaders`], the
/// header itself stays in the record; only its value is masked.
#[derive(Debug, Clone)]
pub struct HeaderValueRedactor {
    names: Vec<String>,
    placeholder: String,
}

impl HeaderValueRedactor {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.into().to_lowercase())
                .collect(),
            placeholder: REDACTED_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

impl Redactor for HeaderValueRedactor {
    fn redact(&self, mut context: RedactionContext) -> RedactionContext {
        for (name, value) in context.headers.iter_mut() {
            if self.names.iter().any(|n| n == &name.to_lowercase()) {
                *value = self.placeholder.clone();
            }
        }
        context
    }
}

/// Header names excluded wholesale from persisted records
#[derive(Debug, Clone, Default)]
pub struct ExcludedHeaders {
    names: Vec<String>,
}

impl ExcludedHeaders {
    /// Build an exclusion list; names match case-insensitively
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.into().to_lowercase())
                .collect(),
        }
    }

    /// An empty list: no stripping
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the given header name is excluded
    pub fn is_excluded(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.names.iter().any(|n| n == &lowered)
    }

    /// Copy of `headers` with every excluded name removed
    pub fn strip(&self, headers: &Headers) -> Headers {
        headers
            .iter()
            .filter(|(name, _)| !self.is_excluded(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}
