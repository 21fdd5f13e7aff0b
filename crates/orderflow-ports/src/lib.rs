// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port traits for the core's external collaborators (§6.4): LLM and
//! embedding providers, the ERP dropzone writer, and the raw-bytes object
//! store. Every adapter — real or mock — implements these traits; the
//! core never depends on a concrete provider.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use orderflow_core::ExtractionRecord;
use orderflow_error::Result;
use serde::{Deserialize, Serialize};

/// Context passed to every provider call: which tenant, and enough of the
/// document's identity for prompt template selection and logging.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    /// Tenant the call is made on behalf of.
    pub tenant_id: orderflow_core::TenantId,
    /// Prompt/template identifier to use, e.g. `"pdf_extract_text_v1"`.
    pub template_id: String,
    /// Layout fingerprint of the source document, for few-shot selection.
    pub layout_fingerprint: Option<String>,
}

/// Result of one LLM call, independent of whether it was an extraction or
/// a repair attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmCallResult {
    /// Raw text returned by the provider, before any JSON parsing.
    pub raw_output: String,
    /// Parsed JSON, if `raw_output` was valid JSON.
    pub parsed_json: Option<serde_json::Value>,
    /// Provider name, e.g. `"openai"`.
    pub provider: String,
    /// Model identifier, e.g. `"gpt-4.1"`.
    pub model: String,
    /// Prompt tokens consumed.
    pub prompt_tokens: u64,
    /// Completion tokens consumed.
    pub completion_tokens: u64,
    /// Wall-clock latency of the call, in milliseconds.
    pub latency_ms: u64,
    /// Cost of the call, in micros of the tenant's billing currency.
    pub cost_micros: i64,
    /// Non-fatal warnings the provider surfaced.
    pub warnings: Vec<String>,
}

/// Port to a large language model provider (§6.4).
#[async_trait]
pub trait LlmProviderPort: Send + Sync {
    /// Prompted extraction over a document's text layer.
    async fn extract_text(&self, text: &str, context: &ProviderContext) -> Result<LlmCallResult>;

    /// Prompted extraction over rendered page images.
    async fn extract_vision(
        &self,
        page_images: &[Vec<u8>],
        context: &ProviderContext,
    ) -> Result<LlmCallResult>;

    /// Ask the provider to repair a previous malformed JSON output.
    async fn repair_json(
        &self,
        previous_output: &str,
        error: &str,
        context: &ProviderContext,
    ) -> Result<String>;
}

/// Port to an embedding provider (§6.4).
#[async_trait]
pub trait EmbeddingProviderPort: Send + Sync {
    /// The dimensionality of vectors this provider returns.
    fn dimension(&self) -> usize;

    /// Embed `text`. Callers must check `dimension()` against the
    /// tenant's configured embedding dimension before calling this —
    /// a dimension mismatch is a caller bug, not a provider failure.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Port to the ERP dropzone (§6.4, §4.12).
#[async_trait]
pub trait DropzoneWriterPort: Send + Sync {
    /// Atomically write `bytes` to `path`: write to a temp name, fsync,
    /// rename into place.
    async fn write_atomic(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// List acknowledgement/error files under `prefix`.
    async fn list_acks(&self, prefix: &str) -> Result<Vec<String>>;

    /// Read a file's contents.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete a file.
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Port to the raw-bytes object store (§6.4).
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// Store `bytes` under `key`, which the caller has already derived
    /// from content (e.g. a SHA-256 hash).
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch bytes previously stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the object at `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// A short-lived, presigned URL for reading `key`, if the backing
    /// store supports it.
    async fn presigned_read(&self, key: &str) -> Result<Option<String>>;
}

/// Port to the draft/catalog relational store, scoped to the pieces the
/// core actually needs rather than a full repository-per-entity split.
#[async_trait]
pub trait DraftRepositoryPort: Send + Sync {
    /// Load the canonical extraction record most recently attached to a
    /// document, if any extraction has succeeded.
    async fn latest_successful_extraction(
        &self,
        document_id: orderflow_core::DocumentId,
    ) -> Result<Option<ExtractionRecord>>;
}

/// Port to the product/price/mapping catalog, scoped to matcher and
/// validator lookups.
#[async_trait]
pub trait CatalogRepositoryPort: Send + Sync {
    /// Resolve a confirmed or suggested SKU mapping for a customer's
    /// normalized SKU, if one exists.
    async fn find_sku_mapping(
        &self,
        tenant_id: orderflow_core::TenantId,
        customer_id: orderflow_core::CustomerId,
        normalized_sku: &str,
    ) -> Result<Option<orderflow_core::SkuMappingId>>;
}

/// Port to the push/export idempotency record store (§4.12).
#[async_trait]
pub trait PushRecordPort: Send + Sync {
    /// Look up a previously written export for `(tenant, draft,
    /// idempotency_key)`, if a push with that key has already completed.
    async fn find_by_idempotency_key(
        &self,
        tenant_id: orderflow_core::TenantId,
        draft_id: orderflow_core::DraftOrderId,
        idempotency_key: &str,
    ) -> Result<Option<serde_json::Value>>;

    /// Record the export produced by a push, under its idempotency key if
    /// one was supplied.
    async fn record(
        &self,
        tenant_id: orderflow_core::TenantId,
        draft_id: orderflow_core::DraftOrderId,
        idempotency_key: Option<&str>,
        export_record: serde_json::Value,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_context_carries_template_and_fingerprint() {
        let ctx = ProviderContext {
            tenant_id: orderflow_core::TenantId::new(),
            template_id: "pdf_extract_text_v1".to_string(),
            layout_fingerprint: Some("abc123".to_string()),
        };
        assert_eq!(ctx.template_id, "pdf_extract_text_v1");
        assert!(ctx.layout_fingerprint.is_some());
    }

    #[test]
    fn llm_call_result_serializes_round_trip() {
        let result = LlmCallResult {
            raw_output: "{}".to_string(),
            parsed_json: Some(serde_json::json!({})),
            provider: "openai".to_string(),
            model: "gpt-4.1".to_string(),
            prompt_tokens: 100,
            completion_tokens: 50,
            latency_ms: 1200,
            cost_micros: 340,
            warnings: vec![],
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: LlmCallResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.model, "gpt-4.1");
    }
}
