// src/replay/replayer.rs
//! Replaying client decorator
//!
//! Implements the HTTP client capability entirely from the transaction
//! store. The transaction set loads lazily on first use; the load is
//! race-safe, so concurrent first calls share one directory scan. Lookup
//! matches on method and URL exactly as they were persisted. A miss is the
//! one user-visible failure mode and always names the call that missed.

use crate::client::{HttpClient, HttpRequest, HttpResponse};
use crate::recording::store::TransactionStore;
use crate::transaction::Transaction;
use crate::utils::config::EngineConfig;
use crate::utils::errors::{EngineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

/// How repeated calls to the same (method, url) are served
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayMode {
    /// Every matching call replays the first recorded transaction.
    /// Deterministic and order-independent; the default.
    #[default]
    Repeatable,

    /// Each matching call consumes the next recorded transaction for that
    /// key; exhaustion fails like a miss. Explicit opt-in.
    Sequential,
}

type MatchKey = (String, String);

#[derive(Debug, Default)]
struct ReplayIndex {
    by_call: HashMap<MatchKey, Vec<Transaction>>,
    total: usize,
}

impl ReplayIndex {
    fn build(transactions: Vec<Transaction>) -> Self {
        let total = transactions.len();
        let mut by_call: HashMap<MatchKey, Vec<Transaction>> = HashMap::new();
        // Transactions arrive in recorded order and stay that way per key.
        for transaction in transactions {
            let key = match_key(&transaction.request.method, &transaction.request.url);
            by_call.entry(key).or_default().push(transaction);
        }
        Self { by_call, total }
    }
}

fn match_key(method: &str, url: &str) -> MatchKey {
    (method.to_uppercase(), url.to_string())
}

/// HTTP client that answers from stored transactions only
pub struct ReplayClient {
    store: TransactionStore,
    mode: ReplayMode,
    index: OnceCell<ReplayIndex>,
    cursors: Mutex<HashMap<MatchKey, usize>>,
}

impl ReplayClient {
    /// Replay from the given store in the default repeatable mode
    pub fn new(store: TransactionStore) -> Self {
        Self {
            store,
            mode: ReplayMode::default(),
            index: OnceCell::new(),
            cursors: Mutex::new(HashMap::new()),
        }
    }

    /// Replay using the recordings directory and mode from `config`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.store()).with_mode(config.replay_mode)
    }

    /// Select the matching mode
    pub fn with_mode(mut self, mode: ReplayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Force the index load now instead of on first use
    ///
    /// Returns how many transactions are indexed.
    pub async fn preload(&self) -> Result<usize> {
        Ok(self.index().await?.total)
    }

    async fn index(&self) -> Result<&ReplayIndex> {
        self.index
            .get_or_try_init(|| async {
                let report = self.store.read_all().await?;
                info!(
                    "replay index loaded: {} transactions ({} files skipped)",
                    report.transactions.len(),
                    report.skipped.len()
                );
                Ok(ReplayIndex::build(report.transactions))
            })
            .await
    }

    async fn position(&self, key: &MatchKey, available: usize) -> Option<usize> {
        match self.mode {
            ReplayMode::Repeatable => Some(0),
            ReplayMode::Sequential => {
                let mut cursors = self.cursors.lock().await;
                let cursor = cursors.entry(key.clone()).or_insert(0);
                if *cursor >= available {
                    None
                } else {
                    let position = *cursor;
                    *cursor += 1;
                    Some(position)
                }
            }
        }
    }
}

#[async_trait]
impl HttpClient for ReplayClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let index = self.index().await?;
        let key = match_key(&request.method, &request.url);

        let not_found = || EngineError::TransactionNotFound {
            method: request.method.clone(),
            url: request.url.clone(),
        };

        let matches = index.by_call.get(&key).ok_or_else(not_found)?;
        let position = self
            .position(&key, matches.len())
            .await
            .ok_or_else(not_found)?;

        let transaction = &matches[position];
        debug!(
            "replaying {} {} from {}",
            request.method, request.url, transaction.id
        );
        Ok(transaction.response.clone())
    }
}
