// src/recording/store.rs
//! Filesystem-backed transaction storage
//!
//! One pretty-printed JSON file per transaction, named by the transaction
//! id. Writes go to a temporary name and are renamed into place, so a
//! crashed or cancelled write never leaves a half-written fixture visible
//! to a scan. Reads enumerate the whole directory and isolate per-file
//! failures: one corrupt fixture is skipped and reported without blinding
//! the rest of the suite.

use crate::transaction::{Transaction, TransactionDocument};
use crate::utils::errors::{EngineError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const FILE_EXTENSION: &str = "json";
const TMP_EXTENSION: &str = "tmp";

/// Result of scanning the recordings directory
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Every transaction that deserialized cleanly, in recorded order
    pub transactions: Vec<Transaction>,

    /// Files that could not be read or parsed, with the reason
    pub skipped: Vec<SkippedFile>,
}

/// A fixture file the scan had to leave out
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: EngineError,
}

/// Write-once, read-many transaction persistence
#[derive(Debug, Clone)]
pub struct TransactionStore {
    dir: PathBuf,
}

impl TransactionStore {
    /// Create a store over the given recordings directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The recordings directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the recordings directory if absent
    ///
    /// Idempotent and safe when raced by concurrent first calls.
    pub async fn ensure_ready(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| EngineError::DirectoryCreation {
                path: self.dir.clone(),
                source,
            })?;
        debug!("recordings directory ready at {:?}", self.dir);
        Ok(())
    }

    /// Persist one transaction as a fresh file named by its id
    ///
    /// Returns the final path. Serializer failures propagate as
    /// `BodySerialization`; I/O failures as `FileSystemWrite`.
    pub async fn write(&self, transaction: &Transaction) -> Result<PathBuf> {
        let document = TransactionDocument::encode(transaction)?;
        let bytes = document.to_json()?;

        let final_path = self.file_path(transaction.id.as_str());
        let tmp_path = final_path.with_extension(format!("{FILE_EXTENSION}.{TMP_EXTENSION}"));

        fs::write(&tmp_path, &bytes)
            .await
            .map_err(|source| EngineError::FileSystemWrite {
                path: tmp_path.clone(),
                operation: "write",
                source,
            })?;
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|source| EngineError::FileSystemWrite {
                path: final_path.clone(),
                operation: "rename",
                source,
            })?;

        debug!("wrote transaction {} ({} bytes)", transaction.id, bytes.len());
        Ok(final_path)
    }

    /// Enumerate and deserialize every transaction file in the directory
    ///
    /// Listing failure is fatal; per-file failures are collected in the
    /// report and logged, never propagated.
    pub async fn read_all(&self) -> Result<ScanReport> {
        let mut entries =
            fs::read_dir(&self.dir)
                .await
                .map_err(|source| EngineError::FileSystemRead {
                    path: self.dir.clone(),
                    operation: "list",
                    source,
                })?;

        let mut report = ScanReport::default();

        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| EngineError::FileSystemRead {
                    path: self.dir.clone(),
                    operation: "list",
                    source,
                })?;
            let Some(entry) = entry else {
                break;
            };

            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }

            match read_one(&path).await {
                Ok(transaction) => report.transactions.push(transaction),
                Err(error) => {
                    warn!("skipping unreadable transaction file {:?}: {}", path, error);
                    report.skipped.push(SkippedFile { path, error });
                }
            }
        }

        // Recorded order: the id's timestamp, then the id itself.
        report.transactions.sort_by(|a, b| {
            let at = a.recorded_at_ms().unwrap_or(i64::MAX);
            let bt = b.recorded_at_ms().unwrap_or(i64::MAX);
            at.cmp(&bt).then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });

        info!(
            "scanned {:?}: {} transactions, {} skipped",
            self.dir,
            report.transactions.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn file_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{FILE_EXTENSION}"))
    }
}

async fn read_one(path: &Path) -> Result<Transaction> {
    let bytes = fs::read(path)
        .await
        .map_err(|source| EngineError::FileSystemRead {
            path: path.to_path_buf(),
            operation: "read",
            source,
        })?;
    TransactionDocument::from_json(&bytes)?.decode()
}
