// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared command implementations for the OrderFlow CLI.
//!
//! These functions are library-level so they can be tested without
//! spawning the binary.

use std::path::Path;

use anyhow::{bail, Context, Result};
use orderflow_config::{ConfigWarning, OrderFlowConfig};
use orderflow_extract_router::{
    choose_extractor, BudgetGateInputs, DocumentMediaKind, DocumentProfile, ExtractorChoice, RuleExtractionOutcome,
};

/// Load, parse, and validate a configuration file, returning the parsed
/// config and any non-fatal warnings. A validation or parse error is
/// returned as `Err`.
pub fn validate_config_file(path: &Path) -> Result<(OrderFlowConfig, Vec<ConfigWarning>)> {
    let config = orderflow_config::load_config(Some(path)).with_context(|| format!("load config '{}'", path.display()))?;
    let warnings = orderflow_config::validate_config(&config).context("validate config")?;
    Ok((config, warnings))
}

/// Infer a [`DocumentMediaKind`] from a file's extension.
pub fn media_kind_from_path(path: &Path) -> Result<DocumentMediaKind> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Ok(DocumentMediaKind::Csv),
        "xlsx" => Ok(DocumentMediaKind::Xlsx),
        "pdf" => Ok(DocumentMediaKind::Pdf),
        other => bail!("unrecognized document extension '{other}' (expected csv, xlsx, or pdf)"),
    }
}

/// Inputs for a local, offline run of the extractor router decision
/// (§4.4), for operators diagnosing why a document escalated (or didn't).
#[derive(Debug, Clone)]
pub struct RouteInputs {
    /// The document's media kind.
    pub media_kind: DocumentMediaKind,
    /// Fraction of page area covered by extractable text (PDFs only).
    pub text_coverage_ratio: f64,
    /// Total extracted text character count (PDFs only).
    pub text_chars_total: usize,
    /// Page count (PDFs only).
    pub page_count: u32,
    /// Prior rule-extraction outcome, if one is available.
    pub rule_outcome: Option<RuleExtractionOutcome>,
    /// Whether this is an operator-forced retry.
    pub operator_retry: bool,
    /// Maximum page count an LLM call may be dispatched for.
    pub max_page_count: u32,
    /// Maximum estimated tokens a single LLM call may consume.
    pub max_tokens_per_call: u64,
    /// Whether the tenant's daily AI cost budget is already exhausted.
    pub tenant_daily_budget_exhausted: bool,
}

/// Run the extractor router decision for diagnostic inspection.
#[must_use]
pub fn route_decision(inputs: &RouteInputs) -> ExtractorChoice {
    let profile = DocumentProfile {
        media_kind: inputs.media_kind,
        text_coverage_ratio: inputs.text_coverage_ratio,
        text_chars_total: inputs.text_chars_total,
        page_count: inputs.page_count,
    };
    let budget = BudgetGateInputs {
        max_page_count: inputs.max_page_count,
        max_tokens_per_call: inputs.max_tokens_per_call,
        tenant_daily_budget_exhausted: inputs.tenant_daily_budget_exhausted,
    };
    choose_extractor(&profile, inputs.rule_outcome.as_ref(), &budget, inputs.operator_retry)
}

/// Fetch and parse a JSON body from a daemon operator endpoint.
pub async fn fetch_json(base_url: &str, path: &str) -> Result<serde_json::Value> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);
    let response = reqwest::get(&url).await.with_context(|| format!("GET {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("GET {url} returned {status}");
    }
    response.json().await.with_context(|| format!("parse JSON body from {url}"))
}
