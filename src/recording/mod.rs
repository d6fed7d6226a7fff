// src/recording/mod.rs
//! Transaction recording and storage
//!
//! The write side of the engine:
//!
//! - **Recorder**: HTTP client decorator capturing real calls
//! - **Store**: one-file-per-transaction filesystem persistence
//!
//! # Architecture
//!
//! ```text
//! Caller → RecordingClient.send() → wrapped client → real response
//!                 │                                      │
//!                 │   strip excluded headers             ▼
//!                 ├── redact request/response     (returned unchanged)
//!                 ├── stamp TransactionId
//!                 └── TransactionStore.write (tmp + rename)
//! ```

pub mod recorder;
pub mod store;

// Re-export commonly used types
pub use recorder::RecordingClient;
pub use store::{ScanReport, SkippedFile, TransactionStore};
