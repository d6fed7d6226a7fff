// src/lib.rs
//! Httptape: deterministic HTTP record/replay for test suites
//!
//! Record real outbound HTTP request/response pairs to disk once, then
//! replay them on later runs without a network call.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **client**: the abstract HTTP client capability and value types
//! - **recording**: the recording decorator and filesystem store
//! - **replay**: the replaying decorator and its lookup index
//! - **redaction**: the pluggable redaction pipeline and header exclusion
//! - **transaction**: transaction ids, slugs, and the persisted document
//! - **utils**: errors and configuration
//!
//! # Usage
//!
//! ```ignore
//! use httptape::{EngineConfig, HttpClient, HttpRequest, RecordingClient, ReplayClient};
//!
//! let config = EngineConfig::load()?;
//!
//! // Record run: wrap the real transport.
//! let recorder = RecordingClient::from_config(httptape::HyperTransport::new(), &config);
//! recorder.ensure_ready().await?;
//! let response = recorder.send(HttpRequest::get("http://api.example.com/users/42")).await?;
//!
//! // Replay run: no network at all.
//! let replayer = ReplayClient::from_config(&config);
//! let replayed = replayer.send(HttpRequest::get("http://api.example.com/users/42")).await?;
//! ```

// Public module exports
pub mod client;
pub mod recording;
pub mod redaction;
pub mod replay;
pub mod transaction;
pub mod utils;

// Re-export commonly used types
pub use client::{Headers, HttpClient, HttpRequest, HttpResponse, HyperTransport};
pub use recording::{RecordingClient, ScanReport, TransactionStore};
pub use redaction::{ExcludedHeaders, IdentityRedactor, RedactionContext, Redactor};
pub use replay::{ReplayClient, ReplayMode};
pub use transaction::{Slug, Transaction, TransactionId};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
