// SPDX-License-Identifier: MIT OR Apache-2.0
//! LLM Extractor (C6): versioned prompt templates, the fixed
//! parse-and-guard pipeline that turns raw model output into a trustworthy
//! [`orderflow_core::ExtractionRecord`], and the hallucination guards that
//! keep it honest.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod guards;
pub mod pipeline;
pub mod templates;

pub use guards::{
    check_anchor, check_density_tripped, check_range, AnchorResult, DEFAULT_MAX_QTY,
    DENSITY_LINE_COUNT_THRESHOLD, DENSITY_MAX_PAGE_COUNT, DENSITY_PENALTY, GUARD_TRIPPED_OVERALL_CAP,
};
pub use pipeline::{
    apply_guards, decode_with_repair, has_json_object_prefix, normalize, validate_schema, GuardReport,
    DEFAULT_MAX_LINE_COUNT,
};
pub use templates::{select_few_shot_examples, PromptTemplate, MAX_FEW_SHOT_EXAMPLES};

use orderflow_core::ExtractionRecord;
use orderflow_error::Result;
use orderflow_ports::{LlmProviderPort, ProviderContext};

/// Run the full six-step parse-and-guard pipeline (§4.6) over one raw
/// model response, producing a normalized, guarded [`ExtractionRecord`].
pub async fn run_pipeline(
    raw_output: &str,
    source_text: &str,
    page_count: u32,
    max_line_count: usize,
    provider: &dyn LlmProviderPort,
    context: &ProviderContext,
) -> Result<(ExtractionRecord, GuardReport)> {
    let value = decode_with_repair(raw_output, provider, context).await?;
    let record = validate_schema(value)?;
    let mut record = normalize(record, max_line_count);
    let report = apply_guards(&mut record, source_text, page_count);
    Ok((record, report))
}
