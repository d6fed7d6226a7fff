// src/transaction/mod.rs
//! Transaction domain types
//!
//! A transaction is one recorded HTTP call: the (possibly redacted) request
//! and response pair plus the id that names its file on disk.
//!
//! - **Id / Slug codec**: stable, sortable, filesystem-safe identifiers
//! - **Document**: the persisted JSON shape and its body encoding rules

use crate::client::{HttpRequest, HttpResponse};
use crate::utils::errors::Result;
use std::fmt;

pub mod document;
pub mod id;

// Re-export commonly used types
pub use document::{StoredBody, TransactionDocument};
pub use id::{DecodedId, IdGenerator, Slug, TransactionId};

/// Which half of a transaction a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSide {
    Request,
    Response,
}

impl fmt::Display for TransactionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// One recorded HTTP call
///
/// Immutable once created; the store never rewrites a transaction and
/// replay never mutates one.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Identity, doubling as the file name stem
    pub id: TransactionId,

    /// The persisted request, after redaction
    pub request: HttpRequest,

    /// The persisted response, after redaction
    pub response: HttpResponse,
}

impl Transaction {
    /// Assemble a transaction from its parts
    pub fn new(id: TransactionId, request: HttpRequest, response: HttpResponse) -> Self {
        Self {
            id,
            request,
            response,
        }
    }

    /// Creation time in unix milliseconds, recovered from the id
    pub fn recorded_at_ms(&self) -> Result<i64> {
        self.id.timestamp_ms()
    }
}
