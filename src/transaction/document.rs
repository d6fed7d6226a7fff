// src/transaction/document.rs
//! Persisted transaction documents
//!
//! Converts an in-memory transaction to the JSON shape written to disk and
//! back. Bodies are stored structurally when they parse as JSON and as
//! plain text when they are valid UTF-8; JSON bodies therefore come back
//! with normalized byte layout but an identical structural value. A body
//! that is neither fails on its own, without touching the headers and
//! status already captured for the other side.

use crate::client::{Headers, HttpRequest, HttpResponse};
use crate::transaction::{Transaction, TransactionId, TransactionSide};
use crate::utils::errors::{EngineError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A body in its storable representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "content", rename_all = "snake_case")]
pub enum StoredBody {
    /// Bytes that parsed as JSON, stored structurally
    Json(serde_json::Value),

    /// Valid UTF-8 that is not JSON
    Text(String),
}

/// Request half of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDocument {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<StoredBody>,
}

/// Response half of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDocument {
    pub status: u16,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<StoredBody>,
}

/// The on-disk shape of one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDocument {
    /// Transaction id; also the file name stem
    pub id: String,

    /// Creation time, unix milliseconds (duplicated from the id for
    /// readability of the fixture file)
    pub recorded_at_unix_ms: i64,

    pub request: RequestDocument,
    pub response: ResponseDocument,
}

impl TransactionDocument {
    /// Convert a transaction into its storable document
    pub fn encode(transaction: &Transaction) -> Result<Self> {
        let request_body = encode_body(TransactionSide::Request, transaction.request.body.as_ref())?;
        let response_body =
            encode_body(TransactionSide::Response, transaction.response.body.as_ref())?;

        Ok(Self {
            id: transaction.id.as_str().to_string(),
            recorded_at_unix_ms: transaction.id.timestamp_ms()?,
            request: RequestDocument {
                method: transaction.request.method.clone(),
                url: transaction.request.url.clone(),
                headers: transaction.request.headers.clone(),
                body: request_body,
            },
            response: ResponseDocument {
                status: transaction.response.status,
                headers: transaction.response.headers.clone(),
                body: response_body,
            },
        })
    }

    /// Exact inverse of [`TransactionDocument::encode`]
    pub fn decode(self) -> Result<Transaction> {
        let id = TransactionId::parse(&self.id).map_err(|_| {
            EngineError::TransactionSerialization {
                operation: "deserialize",
                detail: format!("malformed transaction id `{}`", self.id),
            }
        })?;

        let request = HttpRequest {
            method: self.request.method,
            url: self.request.url,
            headers: self.request.headers,
            body: self.request.body.map(decode_body),
        };
        let response = HttpResponse {
            status: self.response.status,
            headers: self.response.headers,
            body: self.response.body.map(decode_body),
        };

        Ok(Transaction::new(id, request, response))
    }

    /// Render the document as pretty-printed JSON bytes
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| EngineError::TransactionSerialization {
            operation: "serialize",
            detail: e.to_string(),
        })
    }

    /// Parse a document from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| EngineError::TransactionSerialization {
            operation: "deserialize",
            detail: e.to_string(),
        })
    }
}

fn encode_body(side: TransactionSide, body: Option<&Bytes>) -> Result<Option<StoredBody>> {
    let Some(bytes) = body else {
        return Ok(None);
    };

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) {
        return Ok(Some(StoredBody::Json(value)));
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Some(StoredBody::Text(text.to_string()))),
        Err(e) => Err(EngineError::BodySerialization {
            side,
            detail: format!("body is neither JSON nor UTF-8 text: {e}"),
        }),
    }
}

fn decode_body(body: StoredBody) -> Bytes {
    match body {
        StoredBody::Json(value) => {
            Bytes::from(serde_json::to_vec(&value).expect("serde_json::Value always serializes"))
        }
        StoredBody::Text(text) => Bytes::from(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Slug;

    fn canonical_json(value: &serde_json::Value) -> Bytes {
        Bytes::from(serde_json::to_vec(value).unwrap())
    }

    fn sample_transaction() -> Transaction {
        let id = TransactionId::create(1700000000123, "GET", &Slug::from_raw("/users/42"));
        let request = HttpRequest::get("https://api.example.com/users/42")
            .with_header("accept", "application/json");
        let response = HttpResponse::new(200)
            .with_header("content-type", "application/json")
            .with_body(canonical_json(&serde_json::json!({"id": 42, "name": "Ada"})));
        Transaction::new(id, request, response)
    }

    #[test]
    fn test_round_trip_json_body() {
        let transaction = sample_transaction();
        let document = TransactionDocument::encode(&transaction).unwrap();
        let decoded = document.decode().unwrap();
        assert_eq!(decoded, transaction);
    }

    #[test]
    fn test_round_trip_through_json_bytes() {
        let transaction = sample_transaction();
        let bytes = TransactionDocument::encode(&transaction)
            .unwrap()
            .to_json()
            .unwrap();
        let decoded = TransactionDocument::from_json(&bytes).unwrap().decode().unwrap();
        assert_eq!(decoded, transaction);
    }

    #[test]
    fn test_round_trip_text_body() {
        let mut transaction = sample_transaction();
        transaction.response.body = Some(Bytes::from("plain text, not json"));

        let document = TransactionDocument::encode(&transaction).unwrap();
        assert!(matches!(
            document.response.body,
            Some(StoredBody::Text(ref text)) if text == "plain text, not json"
        ));
        assert_eq!(document.clone().decode().unwrap(), transaction);
    }

    #[test]
    fn test_absent_bodies_stay_absent() {
        let mut transaction = sample_transaction();
        transaction.response.body = None;

        let document = TransactionDocument::encode(&transaction).unwrap();
        assert!(document.request.body.is_none());
        assert!(document.response.body.is_none());
        assert_eq!(document.decode().unwrap(), transaction);
    }

    #[test]
    fn test_json_body_is_stored_structurally() {
        let transaction = sample_transaction();
        let document = TransactionDocument::encode(&transaction).unwrap();
        match document.response.body {
            Some(StoredBody::Json(ref value)) => assert_eq!(value["name"], "Ada"),
            ref other => panic!("expected structural body, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_body_fails_with_side_tag() {
        let mut transaction = sample_transaction();
        transaction.request.body = Some(Bytes::from_static(&[0x80, 0xff, 0x00]));

        let err = TransactionDocument::encode(&transaction).unwrap_err();
        match err {
            EngineError::BodySerialization { side, .. } => {
                assert_eq!(side, TransactionSide::Request);
            }
            other => panic!("expected BodySerialization, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_document_is_a_deserialize_error() {
        let err = TransactionDocument::from_json(b"{ not json").unwrap_err();
        assert!(matches!(
            err,
            EngineError::TransactionSerialization {
                operation: "deserialize",
                ..
            }
        ));

        let structurally_wrong = serde_json::json!({"id": "1__GET_x"});
        let err =
            TransactionDocument::from_json(structurally_wrong.to_string().as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::TransactionSerialization {
                operation: "deserialize",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_embedded_id_is_a_deserialize_error() {
        let mut document = TransactionDocument::encode(&sample_transaction()).unwrap();
        document.id = "not-an-id".to_string();

        let err = document.decode().unwrap_err();
        assert!(matches!(
            err,
            EngineError::TransactionSerialization {
                operation: "deserialize",
                ..
            }
        ));
    }
}
