// src/recording/recorder.rs
//! Recording client decorator
//!
//! Wraps a real HTTP client. Every call goes out over the wrapped client as
//! normal; on the way back the request/response pair is redacted,
//! serialized and written to the store. The caller always receives the
//! original, unredacted response. Persistence is best-effort observability:
//! a store failure is logged and never fails the HTTP call itself.

use crate::client::{HttpClient, HttpRequest, HttpResponse};
use crate::recording::store::TransactionStore;
use crate::redaction::{ExcludedHeaders, IdentityRedactor, RedactionContext, Redactor};
use crate::transaction::{IdGenerator, Slug, Transaction, TransactionId};
use crate::utils::config::EngineConfig;
use crate::utils::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP client decorator that records every call it forwards
pub struct RecordingClient<C> {
    inner: C,
    store: TransactionStore,
    redactor: Arc<dyn Redactor>,
    redaction_enabled: bool,
    excluded_headers: ExcludedHeaders,
    ids: IdGenerator,
}

impl<C> RecordingClient<C> {
    /// Decorate `inner`, persisting transactions through `store`
    ///
    /// Defaults: identity redaction, no excluded headers.
    pub fn new(inner: C, store: TransactionStore) -> Self {
        Self {
            inner,
            store,
            redactor: Arc::new(IdentityRedactor),
            redaction_enabled: true,
            excluded_headers: ExcludedHeaders::none(),
            ids: IdGenerator::new(),
        }
    }

    /// Decorate `inner` using the store and exclusions from `config`
    pub fn from_config(inner: C, config: &EngineConfig) -> Self {
        let mut client = Self::new(inner, config.store());
        client.redaction_enabled = config.redaction_enabled;
        client.excluded_headers = config.excluded();
        client
    }

    /// Install a redaction policy
    pub fn with_redactor(mut self, redactor: Arc<dyn Redactor>) -> Self {
        self.redactor = redactor;
        self
    }

    /// Toggle the redaction transform (excluded-header stripping always runs)
    pub fn with_redaction_enabled(mut self, enabled: bool) -> Self {
        self.redaction_enabled = enabled;
        self
    }

    /// Set the headers excluded wholesale from persisted records
    pub fn with_excluded_headers(mut self, excluded: ExcludedHeaders) -> Self {
        self.excluded_headers = excluded;
        self
    }

    /// Create the recordings directory if absent
    pub async fn ensure_ready(&self) -> Result<()> {
        self.store.ensure_ready().await
    }

    /// The store this recorder writes through
    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    fn redact(&self, context: RedactionContext) -> RedactionContext {
        if self.redaction_enabled {
            self.redactor.redact(context)
        } else {
            context
        }
    }

    async fn persist(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
    ) -> Result<TransactionId> {
        // Excluded headers are stripped before the transform ever sees the
        // capture, and again from its output before anything hits disk.
        let request_headers = self.excluded_headers.strip(&request.headers);
        let response_headers = self.excluded_headers.strip(&response.headers);

        let redacted_request = self.redact(RedactionContext::request(request, request_headers));
        let redacted_response =
            self.redact(RedactionContext::response(request, response, response_headers));

        let id = self.ids.next(&request.method, &Slug::from_raw(&request.path()));
        let transaction = Transaction::new(
            id.clone(),
            HttpRequest {
                method: redacted_request.method,
                url: redacted_request.url,
                headers: self.excluded_headers.strip(&redacted_request.headers),
                body: redacted_request.body,
            },
            HttpResponse {
                status: response.status,
                headers: self.excluded_headers.strip(&redacted_response.headers),
                body: redacted_response.body,
            },
        );

        self.store.write(&transaction).await?;
        debug!("recorded {} {} as {}", request.method, request.url, id);
        Ok(id)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for RecordingClient<C> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.inner.send(request.clone()).await?;

        if let Err(error) = self.persist(&request, &response).await {
            warn!(
                "failed to persist transaction for {} {}: {}",
                request.method, request.url, error
            );
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionDocument;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;
    use tokio::fs;

    /// Route swallowed-error warnings to the test output when `RUST_LOG` asks
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Canned-response client standing in for the real transport
    struct StubClient {
        response: HttpResponse,
        calls: AtomicUsize,
    }

    impl StubClient {
        fn new(response: HttpResponse) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    fn json_response() -> HttpResponse {
        HttpResponse::new(200)
            .with_header("content-type", "application/json")
            .with_json_body(&serde_json::json!({"id": 42, "name": "Ada"}))
    }

    fn authorized_request() -> HttpRequest {
        HttpRequest::get("https://api.example.com/users/42")
            .with_header("authorization", "token secret")
            .with_header("accept", "application/json")
    }

    async fn stored_documents(store: &TransactionStore) -> Vec<TransactionDocument> {
        let mut documents = vec![];
        let mut entries = fs::read_dir(store.dir()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let bytes = fs::read(entry.path()).await.unwrap();
            documents.push(TransactionDocument::from_json(&bytes).unwrap());
        }
        documents
    }

    #[tokio::test]
    async fn test_caller_sees_the_real_response() {
        let dir = tempdir().unwrap();
        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(dir.path()),
        );
        recorder.ensure_ready().await.unwrap();

        let response = recorder.send(authorized_request()).await.unwrap();
        assert_eq!(response, json_response());
        assert_eq!(recorder.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_is_recorded_with_slugged_file_name() {
        let dir = tempdir().unwrap();
        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(dir.path()),
        );
        recorder.ensure_ready().await.unwrap();

        recorder.send(authorized_request()).await.unwrap();

        let report = recorder.store().read_all().await.unwrap();
        assert_eq!(report.transactions.len(), 1);
        let recorded = &report.transactions[0];
        assert!(recorded.id.as_str().ends_with("__GET_users-42"));
        assert_eq!(recorded.request.url, "https://api.example.com/users/42");
        assert_eq!(recorded.response.status, 200);
    }

    #[tokio::test]
    async fn test_excluded_header_never_reaches_disk() {
        let dir = tempdir().unwrap();
        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(dir.path()),
        )
        .with_excluded_headers(ExcludedHeaders::new(["authorization"]));
        recorder.ensure_ready().await.unwrap();

        let response = recorder.send(authorized_request()).await.unwrap();
        // The live response is untouched by persistence-side stripping.
        assert_eq!(response, json_response());

        for document in stored_documents(recorder.store()).await {
            assert!(!document.request.headers.contains_key("authorization"));
            assert!(document.request.headers.contains_key("accept"));
        }
    }

    #[tokio::test]
    async fn test_excluded_header_survives_a_transform_that_reinserts_it() {
        struct ReinsertingRedactor;
        impl Redactor for ReinsertingRedactor {
            fn redact(&self, mut context: RedactionContext) -> RedactionContext {
                context
                    .headers
                    .insert("authorization".to_string(), "sneaky".to_string());
                context
            }
        }

        let dir = tempdir().unwrap();
        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(dir.path()),
        )
        .with_excluded_headers(ExcludedHeaders::new(["authorization"]))
        .with_redactor(Arc::new(ReinsertingRedactor));
        recorder.ensure_ready().await.unwrap();

        recorder.send(authorized_request()).await.unwrap();

        for document in stored_documents(recorder.store()).await {
            assert!(!document.request.headers.contains_key("authorization"));
            assert!(!document.response.headers.contains_key("authorization"));
        }
    }

    #[tokio::test]
    async fn test_redaction_affects_the_record_not_the_caller() {
        use crate::redaction::{HeaderValueRedactor, REDACTED_PLACEHOLDER};

        let dir = tempdir().unwrap();
        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(dir.path()),
        )
        .with_redactor(Arc::new(HeaderValueRedactor::new(["accept"])));
        recorder.ensure_ready().await.unwrap();

        let response = recorder.send(authorized_request()).await.unwrap();
        assert_eq!(response, json_response());

        let report = recorder.store().read_all().await.unwrap();
        assert_eq!(
            report.transactions[0]
                .request
                .headers
                .get("accept")
                .map(String::as_str),
            Some(REDACTED_PLACEHOLDER)
        );
    }

    #[tokio::test]
    async fn test_redaction_disabled_persists_headers_verbatim() {
        use crate::redaction::HeaderValueRedactor;

        let dir = tempdir().unwrap();
        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(dir.path()),
        )
        .with_redactor(Arc::new(HeaderValueRedactor::new(["accept"])))
        .with_redaction_enabled(false);
        recorder.ensure_ready().await.unwrap();

        recorder.send(authorized_request()).await.unwrap();

        let report = recorder.store().read_all().await.unwrap();
        assert_eq!(
            report.transactions[0]
                .request
                .headers
                .get("accept")
                .map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_fail_the_call() {
        init_tracing();
        let dir = tempdir().unwrap();
        // Point the store at a path whose parent is a file, so every write
        // fails while the HTTP call itself succeeds.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(blocker.join("recordings")),
        );

        let response = recorder.send(authorized_request()).await.unwrap();
        assert_eq!(response, json_response());
    }

    #[tokio::test]
    async fn test_unserializable_body_does_not_fail_the_call() {
        init_tracing();
        let dir = tempdir().unwrap();
        let binary = HttpResponse::new(200).with_body(Bytes::from_static(&[0x80, 0xff]));
        let recorder =
            RecordingClient::new(StubClient::new(binary), TransactionStore::new(dir.path()));
        recorder.ensure_ready().await.unwrap();

        let response = recorder.send(authorized_request()).await.unwrap();
        assert_eq!(response.body, Some(Bytes::from_static(&[0x80, 0xff])));

        // Nothing was persisted for the failed body, and nothing crashed.
        let report = recorder.store().read_all().await.unwrap();
        assert!(report.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_rapid_calls_get_distinct_files() {
        let dir = tempdir().unwrap();
        let recorder = RecordingClient::new(
            StubClient::new(json_response()),
            TransactionStore::new(dir.path()),
        );
        recorder.ensure_ready().await.unwrap();

        for _ in 0..20 {
            recorder.send(authorized_request()).await.unwrap();
        }

        let report = recorder.store().read_all().await.unwrap();
        assert_eq!(report.transactions.len(), 20);
    }
}
