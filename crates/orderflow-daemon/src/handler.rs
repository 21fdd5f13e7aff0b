// SPDX-License-Identifier: MIT OR Apache-2.0
//! Default [`ExtractionJobHandler`] wiring the LLM extraction pipeline
//! (C6) to a document's stored bytes. Registered by default so the
//! daemon is runnable out of the box against mock providers.
//!
//! Real deployments swap the [`LlmProviderPort`]/[`ObjectStorePort`]
//! trait objects passed in here for adapters talking to an actual
//! provider and object store; nothing else in the worker pool changes.

use std::sync::Arc;

use async_trait::async_trait;
use orderflow_llm::run_pipeline;
use orderflow_ports::{LlmProviderPort, ObjectStorePort, ProviderContext};

use crate::queue::ExtractionJob;
use crate::retry::{TEXT_EXTRACTION_TIMEOUT, VISION_EXTRACTION_TIMEOUT};
use crate::worker::ExtractionJobHandler;

/// Extraction-pipeline tuning shared across every job this handler runs.
#[derive(Debug, Clone)]
pub struct ExtractionPipelineConfig {
    /// Cap on dense-renumbered line count (§4.6 step 4).
    pub max_line_count: usize,
    /// Whether the source document is routed through vision rather than
    /// text prompting. In production this is decided per-document by
    /// `orderflow-extract-router`; a single handler config field is a
    /// placeholder for whichever router decision dispatch wires in.
    pub use_vision: bool,
}

impl Default for ExtractionPipelineConfig {
    fn default() -> Self {
        Self { max_line_count: 500, use_vision: false }
    }
}

/// Runs the LLM extraction pipeline for a dequeued job, reading the
/// document's stored bytes from an [`ObjectStorePort`] keyed by its
/// document id.
pub struct DefaultExtractionJobHandler {
    llm: Arc<dyn LlmProviderPort>,
    object_store: Arc<dyn ObjectStorePort>,
    config: ExtractionPipelineConfig,
}

impl DefaultExtractionJobHandler {
    /// Construct a handler around the given provider and object store.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProviderPort>, object_store: Arc<dyn ObjectStorePort>, config: ExtractionPipelineConfig) -> Self {
        Self { llm, object_store, config }
    }
}

#[async_trait]
impl ExtractionJobHandler for DefaultExtractionJobHandler {
    async fn handle(&self, job: ExtractionJob) -> Result<(), orderflow_error::OrderFlowError> {
        let object_key = job.document_id.as_uuid().to_string();
        let bytes = self.object_store.get(&object_key).await?;
        let source_text = String::from_utf8_lossy(&bytes).into_owned();

        let context = ProviderContext { tenant_id: job.tenant_id, template_id: "pdf_extract_text_v1".to_string(), layout_fingerprint: None };

        let deadline = if self.config.use_vision { VISION_EXTRACTION_TIMEOUT } else { TEXT_EXTRACTION_TIMEOUT };
        let call = crate::retry::with_deadline(deadline, self.llm.extract_text(&source_text, &context)).await?;

        let (_record, guard_report) = run_pipeline(&call.raw_output, &source_text, 1, self.config.max_line_count, self.llm.as_ref(), &context).await?;

        if guard_report.any_triggered {
            tracing::warn!(
                target: "orderflow.daemon.handler",
                extraction_run_id = ?job.extraction_run_id,
                document_id = ?job.document_id,
                "hallucination guard triggered, confidence capped"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::{DocumentId, ExtractionRunId, TenantId};
    use orderflow_mock::{MockLlmProvider, MockObjectStore};

    #[tokio::test]
    async fn handler_reads_bytes_and_runs_the_pipeline() {
        let document_id = DocumentId::new();
        let tenant_id = TenantId::new();

        let object_store = MockObjectStore::default();
        object_store.put(&document_id.as_uuid().to_string(), b"PO-1 widget qty 2").await.unwrap();

        let llm = MockLlmProvider::default();
        llm.extract_responses.lock().unwrap().push(orderflow_ports::LlmCallResult {
            raw_output: r#"{"order":{"external_order_number":"PO-1","order_date":null,"currency":null,"requested_delivery_date":null,"customer_hint":{"name":null,"email":null,"erp_customer_number":null},"notes":null,"ship_to":null},"lines":[],"confidence":{"header":{},"lines":[],"overall":0.9},"warnings":[],"extractor_version":"llm_text_v1"}"#.to_string(),
            parsed_json: None,
            provider: "mock".to_string(),
            model: "mock-1".to_string(),
            prompt_tokens: 10,
            completion_tokens: 10,
            latency_ms: 5,
            cost_micros: 0,
            warnings: vec![],
        });

        let handler = DefaultExtractionJobHandler::new(Arc::new(llm), Arc::new(object_store), ExtractionPipelineConfig::default());

        let job = ExtractionJob { extraction_run_id: ExtractionRunId::new(), document_id, tenant_id };
        handler.handle(job).await.unwrap();
    }

    #[tokio::test]
    async fn handler_surfaces_not_found_when_object_is_missing() {
        let handler = DefaultExtractionJobHandler::new(Arc::new(MockLlmProvider::default()), Arc::new(MockObjectStore::default()), ExtractionPipelineConfig::default());
        let job = ExtractionJob { extraction_run_id: ExtractionRunId::new(), document_id: DocumentId::new(), tenant_id: TenantId::new() };
        let err = handler.handle(job).await.unwrap_err();
        assert_eq!(err.code, orderflow_error::ErrorCode::NotFound);
    }
}
