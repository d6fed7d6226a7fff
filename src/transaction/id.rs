// src/transaction/id.rs
//! Transaction id and slug codec
//!
//! A transaction id is `"{unix_millis}__{METHOD}_{slug}"`: sortable by
//! creation time, grouped by method and path, and safe to use as a file
//! name. The slug is a lossy one-way derivation of the request path; the
//! timestamp and method round-trip exactly.

use crate::utils::errors::{EngineError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// A filesystem-safe, lowercase identifier fragment
///
/// Matches `[a-z0-9-]*`. Derived from arbitrary text by lowercasing,
/// trimming, turning `/` into `-`, dropping everything outside word, space
/// and hyphen characters, and collapsing separator runs into single
/// hyphens. Re-deriving a slug from itself is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from arbitrary text
    pub fn from_raw(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let mut out = String::with_capacity(lowered.len());
        let mut pending_separator = false;

        for ch in lowered.trim().chars() {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                if pending_separator && !out.is_empty() {
                    out.push('-');
                }
                pending_separator = false;
                out.push(ch);
            } else if ch == '/' || ch == '-' || ch == '_' || ch.is_whitespace() {
                pending_separator = true;
            }
            // Anything else is stripped without breaking the current run.
        }

        Self(out)
    }

    /// View the slug as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the derivation produced an empty slug (legal)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn is_valid(candidate: &str) -> bool {
        candidate
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a stored transaction
///
/// Doubles as the transaction's file name stem; see the module docs for the
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

/// The recoverable parts of a transaction id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedId {
    /// Creation time, unix milliseconds
    pub timestamp_ms: i64,

    /// Upper-case HTTP method
    pub method: String,

    /// Request path slug (lossy, display/grouping aid only)
    pub slug: Slug,
}

impl TransactionId {
    /// Build an id from its parts, uppercasing the method
    pub fn create(timestamp_ms: i64, method: &str, slug: &Slug) -> Self {
        Self(format!(
            "{}__{}_{}",
            timestamp_ms,
            method.to_uppercase(),
            slug.as_str()
        ))
    }

    /// Validate and wrap an existing id string
    pub fn parse(id: &str) -> Result<Self> {
        decode_parts(id)?;
        Ok(Self(id.to_string()))
    }

    /// Recover timestamp, method and slug
    pub fn decode(&self) -> Result<DecodedId> {
        decode_parts(&self.0)
    }

    /// Creation time in unix milliseconds
    pub fn timestamp_ms(&self) -> Result<i64> {
        Ok(self.decode()?.timestamp_ms)
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn decode_parts(id: &str) -> Result<DecodedId> {
    let malformed = || EngineError::InvalidTransactionId { id: id.to_string() };

    let (timestamp, rest) = id.split_once("__").ok_or_else(malformed)?;
    if timestamp.is_empty() || !timestamp.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(malformed());
    }
    let timestamp_ms: i64 = timestamp.parse().map_err(|_| malformed())?;

    let (method, slug) = rest.split_once('_').ok_or_else(malformed)?;
    if method.is_empty() || !method.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(malformed());
    }
    if !Slug::is_valid(slug) {
        return Err(malformed());
    }

    Ok(DecodedId {
        timestamp_ms,
        method: method.to_string(),
        slug: Slug(slug.to_string()),
    })
}

/// Issues unique, strictly increasing transaction timestamps
///
/// Two recorded calls inside the same millisecond would otherwise collide on
/// the same file name; the generator keeps the last issued value and bumps
/// by one millisecond when the clock has not moved yet.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_issued_ms: AtomicI64,
}

impl IdGenerator {
    /// Create a generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id for the given method and slug
    pub fn next(&self, method: &str, slug: &Slug) -> TransactionId {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_issued_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(if now > last { now } else { last + 1 })
            })
            .expect("update closure never returns None");
        let issued = if now > previous { now } else { previous + 1 };

        TransactionId::create(issued, method, slug)
    }
}
