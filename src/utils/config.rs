// src/utils/config.rs
//! Engine configuration
//!
//! The knobs the surrounding test harness or CLI hands to the engine:
//! where recordings live, which headers never hit disk, whether the
//! redaction transform runs, and how replay matches. Loadable from an
//! `httptape` config file and `HTTPTAPE_*` environment variables.

use crate::recording::store::TransactionStore;
use crate::redaction::ExcludedHeaders;
use crate::replay::ReplayMode;
use crate::utils::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration surface of the record/replay engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one JSON file per recorded transaction
    pub recordings_dir: PathBuf,

    /// Header names excluded wholesale from persisted records
    pub excluded_headers: Vec<String>,

    /// Whether the injected redaction transform runs before persistence
    pub redaction_enabled: bool,

    /// Replay matching mode
    pub replay_mode: ReplayMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from("recordings"),
            excluded_headers: vec!["authorization".to_string()],
            redaction_enabled: true,
            replay_mode: ReplayMode::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file and environment
    ///
    /// Sources, later overriding earlier: built-in defaults, an optional
    /// `httptape.{toml,yaml,json}` file in the working directory, then
    /// `HTTPTAPE_*` environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let loaded = config::Config::builder()
            .add_source(config::Config::try_from(&defaults).map_err(|e| EngineError::Config {
                detail: e.to_string(),
            })?)
            .add_source(config::File::with_name("httptape").required(false))
            .add_source(config::Environment::with_prefix("HTTPTAPE").try_parsing(true))
            .build()
            .map_err(|e| EngineError::Config {
                detail: e.to_string(),
            })?;

        loaded.try_deserialize().map_err(|e| EngineError::Config {
            detail: e.to_string(),
        })
    }

    /// A store over the configured recordings directory
    pub fn store(&self) -> TransactionStore {
        TransactionStore::new(&self.recordings_dir)
    }

    /// The configured exclusion list
    pub fn excluded(&self) -> ExcludedHeaders {
        ExcludedHeaders::new(self.excluded_headers.iter().cloned())
    }
}
