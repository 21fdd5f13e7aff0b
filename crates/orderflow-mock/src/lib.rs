// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory implementations of every [`orderflow_ports`] trait, for unit
//! and integration tests across crate boundaries and for local development
//! without any real provider or ERP dropzone configured.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use orderflow_core::{CustomerId, DocumentId, DraftOrderId, ExtractionRecord, SkuMappingId, TenantId};
use orderflow_error::{ErrorCode, OrderFlowError, Result};
use orderflow_ports::{
    CatalogRepositoryPort, DraftRepositoryPort, DropzoneWriterPort, EmbeddingProviderPort, LlmCallResult,
    LlmProviderPort, ObjectStorePort, ProviderContext, PushRecordPort,
};

/// An [`LlmProviderPort`] that returns pre-programmed responses, recording
/// every call it receives for test assertions.
#[derive(Default)]
pub struct MockLlmProvider {
    /// Responses returned by `extract_text`/`extract_vision`, in call order.
    /// Exhausting the queue is a test bug, not a silent fallback.
    pub extract_responses: Mutex<Vec<LlmCallResult>>,
    /// Responses returned by `repair_json`, in call order.
    pub repair_responses: Mutex<Vec<String>>,
    /// Every context this mock has been called with, in call order.
    pub calls: Mutex<Vec<ProviderContext>>,
}

#[async_trait]
impl LlmProviderPort for MockLlmProvider {
    async fn extract_text(&self, _text: &str, context: &ProviderContext) -> Result<LlmCallResult> {
        self.calls.lock().unwrap().push(context.clone());
        self.extract_responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| OrderFlowError::new(ErrorCode::Internal, "MockLlmProvider: no queued extract_text response"))
    }

    async fn extract_vision(&self, _page_images: &[Vec<u8>], context: &ProviderContext) -> Result<LlmCallResult> {
        self.calls.lock().unwrap().push(context.clone());
        self.extract_responses.lock().unwrap().pop().ok_or_else(|| {
            OrderFlowError::new(ErrorCode::Internal, "MockLlmProvider: no queued extract_vision response")
        })
    }

    async fn repair_json(&self, _previous_output: &str, _error: &str, context: &ProviderContext) -> Result<String> {
        self.calls.lock().unwrap().push(context.clone());
        self.repair_responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| OrderFlowError::new(ErrorCode::Internal, "MockLlmProvider: no queued repair_json response"))
    }
}

/// An [`EmbeddingProviderPort`] that returns a fixed-dimension zero vector,
/// or a per-text override registered ahead of time.
pub struct MockEmbeddingProvider {
    dimension: usize,
    overrides: Mutex<HashMap<String, Vec<f32>>>,
}

impl MockEmbeddingProvider {
    /// A mock with the given embedding dimension; `embed` returns a zero
    /// vector of that length unless overridden via [`Self::set_embedding`].
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension, overrides: Mutex::new(HashMap::new()) }
    }

    /// Register a fixed vector to return for a specific input text.
    pub fn set_embedding(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.overrides.lock().unwrap().insert(text.into(), vector);
    }
}

#[async_trait]
impl EmbeddingProviderPort for MockEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(vector) = self.overrides.lock().unwrap().get(text) {
            return Ok(vector.clone());
        }
        Ok(vec![0.0; self.dimension])
    }
}

/// A [`DropzoneWriterPort`] backed by an in-process map, for asserting on
/// atomically-written files without touching a filesystem.
#[derive(Default)]
pub struct MockDropzone {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockDropzone {
    /// Every path currently written, for test assertions.
    #[must_use]
    pub fn written_paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl DropzoneWriterPort for MockDropzone {
    async fn write_atomic(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.files.lock().unwrap().insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn list_acks(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.files.lock().unwrap().keys().filter(|p| p.starts_with(prefix)).cloned().collect())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| OrderFlowError::new(ErrorCode::NotFound, "MockDropzone: no such file").with_context("path", path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}

/// An [`ObjectStorePort`] backed by an in-process map.
#[derive(Default)]
pub struct MockObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStorePort for MockObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| OrderFlowError::new(ErrorCode::NotFound, "MockObjectStore: no such key").with_context("key", key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presigned_read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.objects.lock().unwrap().contains_key(key).then(|| format!("mock://{key}")))
    }
}

/// A [`DraftRepositoryPort`] backed by an in-process map, keyed by
/// document id.
#[derive(Default)]
pub struct MockDraftRepository {
    extractions: Mutex<HashMap<DocumentId, ExtractionRecord>>,
}

impl MockDraftRepository {
    /// Register the extraction that should be returned for `document_id`.
    pub fn set_latest_successful_extraction(&self, document_id: DocumentId, record: ExtractionRecord) {
        self.extractions.lock().unwrap().insert(document_id, record);
    }
}

#[async_trait]
impl DraftRepositoryPort for MockDraftRepository {
    async fn latest_successful_extraction(&self, document_id: DocumentId) -> Result<Option<ExtractionRecord>> {
        Ok(self.extractions.lock().unwrap().get(&document_id).cloned())
    }
}

/// A [`CatalogRepositoryPort`] backed by an in-process map, keyed by
/// `(tenant, customer, normalized_sku)`.
#[derive(Default)]
pub struct MockCatalogRepository {
    mappings: Mutex<HashMap<(TenantId, CustomerId, String), SkuMappingId>>,
}

impl MockCatalogRepository {
    /// Register a confirmed or suggested mapping for a customer's
    /// normalized SKU.
    pub fn set_sku_mapping(
        &self,
        tenant_id: TenantId,
        customer_id: CustomerId,
        normalized_sku: impl Into<String>,
        mapping_id: SkuMappingId,
    ) {
        self.mappings.lock().unwrap().insert((tenant_id, customer_id, normalized_sku.into()), mapping_id);
    }
}

#[async_trait]
impl CatalogRepositoryPort for MockCatalogRepository {
    async fn find_sku_mapping(
        &self,
        tenant_id: TenantId,
        customer_id: CustomerId,
        normalized_sku: &str,
    ) -> Result<Option<SkuMappingId>> {
        Ok(self.mappings.lock().unwrap().get(&(tenant_id, customer_id, normalized_sku.to_string())).copied())
    }
}

/// A [`PushRecordPort`] backed by an in-process map, keyed by idempotency
/// key only (mirrors the real store's uniqueness constraint — callers are
/// expected to scope keys per tenant/draft themselves).
#[derive(Default)]
pub struct MockPushRecords {
    by_key: Mutex<HashMap<String, serde_json::Value>>,
}

#[async_trait]
impl PushRecordPort for MockPushRecords {
    async fn find_by_idempotency_key(
        &self,
        _tenant_id: TenantId,
        _draft_id: DraftOrderId,
        idempotency_key: &str,
    ) -> Result<Option<serde_json::Value>> {
        Ok(self.by_key.lock().unwrap().get(idempotency_key).cloned())
    }

    async fn record(
        &self,
        _tenant_id: TenantId,
        _draft_id: DraftOrderId,
        idempotency_key: Option<&str>,
        export_record: serde_json::Value,
    ) -> Result<()> {
        if let Some(key) = idempotency_key {
            self.by_key.lock().unwrap().insert(key.to_string(), export_record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ProviderContext {
        ProviderContext { tenant_id: TenantId::new(), template_id: "pdf_extract_text_v1".to_string(), layout_fingerprint: None }
    }

    #[tokio::test]
    async fn llm_provider_returns_queued_responses_and_records_calls() {
        let provider = MockLlmProvider::default();
        provider.extract_responses.lock().unwrap().push(LlmCallResult {
            raw_output: "{}".to_string(),
            parsed_json: None,
            provider: "mock".to_string(),
            model: "mock-1".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
            latency_ms: 0,
            cost_micros: 0,
            warnings: vec![],
        });
        let result = provider.extract_text("irrelevant", &context()).await.unwrap();
        assert_eq!(result.model, "mock-1");
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn llm_provider_errors_when_queue_is_exhausted() {
        let provider = MockLlmProvider::default();
        assert!(provider.extract_text("irrelevant", &context()).await.is_err());
    }

    #[tokio::test]
    async fn embedding_provider_returns_zero_vector_by_default() {
        let provider = MockEmbeddingProvider::new(4);
        let vector = provider.embed("anything").await.unwrap();
        assert_eq!(vector, vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn embedding_provider_honors_override() {
        let provider = MockEmbeddingProvider::new(2);
        provider.set_embedding("hello", vec![0.5, 0.5]);
        assert_eq!(provider.embed("hello").await.unwrap(), vec![0.5, 0.5]);
        assert_eq!(provider.embed("other").await.unwrap(), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn dropzone_round_trips_and_lists_by_prefix() {
        let dropzone = MockDropzone::default();
        dropzone.write_atomic("orders/a.json", b"{}").await.unwrap();
        dropzone.write_atomic("acks/a.ack", b"ok").await.unwrap();
        assert_eq!(dropzone.read("orders/a.json").await.unwrap(), b"{}");
        assert_eq!(dropzone.list_acks("acks/").await.unwrap(), vec!["acks/a.ack".to_string()]);
        dropzone.delete("orders/a.json").await.unwrap();
        assert!(dropzone.read("orders/a.json").await.is_err());
    }

    #[tokio::test]
    async fn object_store_put_get_presign_round_trips() {
        let store = MockObjectStore::default();
        store.put("sha256:abc", b"payload").await.unwrap();
        assert_eq!(store.get("sha256:abc").await.unwrap(), b"payload");
        assert_eq!(store.presigned_read("sha256:abc").await.unwrap(), Some("mock://sha256:abc".to_string()));
        assert_eq!(store.presigned_read("sha256:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn draft_repository_returns_none_when_unset() {
        let repo = MockDraftRepository::default();
        assert!(repo.latest_successful_extraction(DocumentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn catalog_repository_resolves_registered_mapping() {
        let repo = MockCatalogRepository::default();
        let tenant_id = TenantId::new();
        let customer_id = CustomerId::new();
        let mapping_id = SkuMappingId::new();
        repo.set_sku_mapping(tenant_id, customer_id, "ab12", mapping_id);
        assert_eq!(repo.find_sku_mapping(tenant_id, customer_id, "ab12").await.unwrap(), Some(mapping_id));
        assert_eq!(repo.find_sku_mapping(tenant_id, customer_id, "zz99").await.unwrap(), None);
    }

    #[tokio::test]
    async fn push_records_idempotency_lookup_round_trips() {
        let records = MockPushRecords::default();
        let tenant_id = TenantId::new();
        let draft_id = DraftOrderId::new();
        assert!(records.find_by_idempotency_key(tenant_id, draft_id, "idem-1").await.unwrap().is_none());
        records.record(tenant_id, draft_id, Some("idem-1"), serde_json::json!({"_filename": "f.json"})).await.unwrap();
        let found = records.find_by_idempotency_key(tenant_id, draft_id, "idem-1").await.unwrap();
        assert_eq!(found.unwrap()["_filename"], "f.json");
    }
}
