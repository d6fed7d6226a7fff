// src/utils/errors.rs
//! Engine error types
//!
//! One closed error enum for the whole engine, with a crate-wide `Result`
//! alias. Filesystem variants carry the target path and the operation that
//! failed; serialization variants carry the side or operation tag so a
//! failure can be attributed to a single transaction file or body.

use crate::transaction::TransactionSide;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;

/// All failure modes of the record/replay engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The recordings directory could not be created
    #[error("failed to create recordings directory {path:?}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transaction file could not be written
    #[error("failed to {operation} transaction file {path:?}")]
    FileSystemWrite {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The recordings directory or a transaction file could not be read
    #[error("failed to {operation} {path:?}")]
    FileSystemRead {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A single body could not be encoded for storage
    #[error("cannot encode {side} body for storage: {detail}")]
    BodySerialization {
        side: TransactionSide,
        detail: String,
    },

    /// A transaction document is structurally invalid
    #[error("invalid transaction document during {operation}: {detail}")]
    TransactionSerialization {
        operation: &'static str,
        detail: String,
    },

    /// Replay found no stored transaction for the requested call
    #[error("no recorded transaction matches {method} {url}")]
    TransactionNotFound { method: String, url: String },

    /// A transaction id does not match `{timestamp}__{METHOD}_{slug}`
    #[error("malformed transaction id `{id}`")]
    InvalidTransactionId { id: String },

    /// The wrapped HTTP transport failed
    #[error("transport error: {detail}")]
    Transport { detail: String },

    /// The configuration layer failed to load or parse
    #[error("configuration error: {detail}")]
    Config { detail: String },
}

impl EngineError {
    /// Shorthand for transport failures surfaced by client implementations
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }
}
