// src/replay/mod.rs
//! Deterministic replay of recorded transactions
//!
//! The replay side of the engine: an HTTP client implementation that
//! answers every call from the recordings directory and never touches the
//! network.

pub mod replayer;

// Re-export commonly used types
pub use replayer::{ReplayClient, ReplayMode};
