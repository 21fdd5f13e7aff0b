// SPDX-License-Identifier: MIT OR Apache-2.0
//! Extractor Router (C4): chooses between the rule extractor and the LLM
//! path for a Document, as a pure decision function over its pre-analysis
//! profile plus the prior rule-extraction outcome when one exists (§4.4).
#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// The media kind of a Document, as classified during pre-analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentMediaKind {
    /// Delimited text, routed to the CSV rule extractor unconditionally.
    Csv,
    /// Spreadsheet, routed to the XLSX rule extractor unconditionally.
    Xlsx,
    /// PDF — may escalate to a text or vision LLM depending on its profile.
    Pdf,
}

/// Pre-analysis profile of a Document, computed once at intake time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentProfile {
    /// The document's media kind.
    pub media_kind: DocumentMediaKind,
    /// Fraction of page area covered by an extractable text layer, for
    /// PDFs. Ignored for CSV/XLSX.
    pub text_coverage_ratio: f64,
    /// Total extracted text character count. Ignored for CSV/XLSX.
    pub text_chars_total: usize,
    /// Page count. Ignored for CSV/XLSX (treated as 1 for token estimates
    /// that never fire on those kinds).
    pub page_count: u32,
}

/// Outcome of the rule extractor's first pass over a PDF, used to decide
/// whether the trigger rule escalates to an LLM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleExtractionOutcome {
    /// Number of lines the rule extractor produced.
    pub line_count: usize,
    /// The rule extractor's own confidence in its output.
    pub extraction_confidence: f64,
    /// Count of lines lacking both a SKU and a description.
    pub lines_missing_sku_and_description: usize,
}

/// Which rule extractor handles a Document's first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleExtractorKind {
    /// `rule_csv`.
    Csv,
    /// `rule_xlsx`.
    Xlsx,
    /// `rule_pdf_text` (`rule_v1` for PDFs).
    PdfText,
}

/// Which LLM mode a PDF escalates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmKind {
    /// Text-prompted extraction over the PDF's text layer.
    Text,
    /// Vision-prompted extraction over rendered page images.
    Vision,
}

/// Why the budget gate aborted an LLM call before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetAbortReason {
    /// `page_count` exceeds the configured per-call maximum.
    PageCountExceeded,
    /// Estimated token count exceeds the per-call cap.
    TokenEstimateExceeded,
    /// The tenant's daily AI cost budget is exhausted.
    DailyBudgetExhausted,
}

/// Budget gate configuration and live state, evaluated fail-closed (§4.4
/// item 3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetGateInputs {
    /// Maximum page count an LLM call may be dispatched for.
    pub max_page_count: u32,
    /// Maximum estimated tokens a single LLM call may consume.
    pub max_tokens_per_call: u64,
    /// Whether the tenant's daily cost budget is already exhausted.
    pub tenant_daily_budget_exhausted: bool,
}

/// The router's decision for one Document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractorChoice {
    /// Use only the rule extractor; the LLM path is never consulted.
    RuleOnly(RuleExtractorKind),
    /// Run the rule extractor, then escalate to the named LLM mode.
    RuleThenLlm {
        /// The rule extractor that ran first.
        rule: RuleExtractorKind,
        /// The LLM mode to escalate to.
        llm: LlmKind,
    },
    /// The trigger rule called for an LLM escalation but the budget gate
    /// aborted it; the rule result (if any) should be kept as-is.
    LlmAborted {
        /// The rule extractor that ran first.
        rule: RuleExtractorKind,
        /// Why the gate aborted.
        reason: BudgetAbortReason,
    },
}

/// Estimate token count for a text-LLM call: `ceil(len(text) / 4)`.
#[must_use]
pub fn estimate_text_tokens(text_chars_total: usize) -> u64 {
    ((text_chars_total as u64) + 3) / 4
}

/// Estimate token count for a vision-LLM call: `1500 * pages`.
#[must_use]
pub fn estimate_vision_tokens(page_count: u32) -> u64 {
    1500 * u64::from(page_count)
}

/// Decide which extractor(s) to run for a Document (§4.4).
///
/// `rule_outcome` is `None` only before the rule extractor has run; for
/// PDFs this function always attempts the rule extractor first regardless
/// of what it returns, so callers should pass `None` to get the initial
/// `RuleOnly`/`RuleThenLlm` choice is not meaningful until they have also
/// run the rule extractor and can supply its outcome for the trigger rule.
///
/// `operator_retry` bypasses the trigger rule (item 2) but never the
/// budget gate (item 3).
#[must_use]
pub fn choose_extractor(
    profile: &DocumentProfile,
    rule_outcome: Option<&RuleExtractionOutcome>,
    budget: &BudgetGateInputs,
    operator_retry: bool,
) -> ExtractorChoice {
    let rule = match profile.media_kind {
        DocumentMediaKind::Csv => return ExtractorChoice::RuleOnly(RuleExtractorKind::Csv),
        DocumentMediaKind::Xlsx => return ExtractorChoice::RuleOnly(RuleExtractorKind::Xlsx),
        DocumentMediaKind::Pdf => RuleExtractorKind::PdfText,
    };

    let has_text = profile.text_chars_total > 0;
    let low_coverage = profile.text_coverage_ratio < 0.15 || profile.text_chars_total < 500;

    let triggered = if low_coverage {
        Some(LlmKind::Vision)
    } else if let Some(outcome) = rule_outcome {
        let more_than_half_missing = outcome.line_count > 0
            && outcome.lines_missing_sku_and_description * 2 > outcome.line_count;
        let weak = outcome.line_count == 0
            || outcome.extraction_confidence < 0.60
            || more_than_half_missing;
        if weak {
            Some(if has_text { LlmKind::Text } else { LlmKind::Vision })
        } else {
            None
        }
    } else {
        None
    };

    let wanted = if operator_retry {
        Some(triggered.unwrap_or(if has_text { LlmKind::Text } else { LlmKind::Vision }))
    } else {
        triggered
    };

    let Some(llm) = wanted else {
        return ExtractorChoice::RuleOnly(rule);
    };

    if profile.page_count > budget.max_page_count {
        return ExtractorChoice::LlmAborted {
            rule,
            reason: BudgetAbortReason::PageCountExceeded,
        };
    }
    let estimated_tokens = match llm {
        LlmKind::Text => estimate_text_tokens(profile.text_chars_total),
        LlmKind::Vision => estimate_vision_tokens(profile.page_count),
    };
    if estimated_tokens > budget.max_tokens_per_call {
        return ExtractorChoice::LlmAborted {
            rule,
            reason: BudgetAbortReason::TokenEstimateExceeded,
        };
    }
    if budget.tenant_daily_budget_exhausted {
        return ExtractorChoice::LlmAborted {
            rule,
            reason: BudgetAbortReason::DailyBudgetExhausted,
        };
    }

    ExtractorChoice::RuleThenLlm { rule, llm }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generous_budget() -> BudgetGateInputs {
        BudgetGateInputs {
            max_page_count: 50,
            max_tokens_per_call: 1_000_000,
            tenant_daily_budget_exhausted: false,
        }
    }

    fn csv_profile() -> DocumentProfile {
        DocumentProfile {
            media_kind: DocumentMediaKind::Csv,
            text_coverage_ratio: 1.0,
            text_chars_total: 2000,
            page_count: 1,
        }
    }

    #[test]
    fn csv_and_xlsx_never_escalate_even_with_operator_retry() {
        let choice = choose_extractor(&csv_profile(), None, &generous_budget(), true);
        assert_eq!(choice, ExtractorChoice::RuleOnly(RuleExtractorKind::Csv));
    }

    #[test]
    fn scanned_pdf_routes_to_vision() {
        // 2-page scan yielding 120 chars total, as in the literal scenario.
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 120.0 / 5000.0,
            text_chars_total: 120,
            page_count: 2,
        };
        let choice = choose_extractor(&profile, None, &generous_budget(), false);
        assert_eq!(
            choice,
            ExtractorChoice::RuleThenLlm {
                rule: RuleExtractorKind::PdfText,
                llm: LlmKind::Vision,
            }
        );
    }

    #[test]
    fn weak_rule_result_with_text_present_escalates_to_text_llm() {
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 0.9,
            text_chars_total: 4000,
            page_count: 3,
        };
        let outcome = RuleExtractionOutcome {
            line_count: 4,
            extraction_confidence: 0.40,
            lines_missing_sku_and_description: 0,
        };
        let choice = choose_extractor(&profile, Some(&outcome), &generous_budget(), false);
        assert_eq!(
            choice,
            ExtractorChoice::RuleThenLlm {
                rule: RuleExtractorKind::PdfText,
                llm: LlmKind::Text,
            }
        );
    }

    #[test]
    fn strong_rule_result_stays_rule_only() {
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 0.9,
            text_chars_total: 4000,
            page_count: 3,
        };
        let outcome = RuleExtractionOutcome {
            line_count: 4,
            extraction_confidence: 0.85,
            lines_missing_sku_and_description: 0,
        };
        let choice = choose_extractor(&profile, Some(&outcome), &generous_budget(), false);
        assert_eq!(choice, ExtractorChoice::RuleOnly(RuleExtractorKind::PdfText));
    }

    #[test]
    fn more_than_half_lines_missing_sku_and_description_escalates() {
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 0.9,
            text_chars_total: 4000,
            page_count: 3,
        };
        let outcome = RuleExtractionOutcome {
            line_count: 4,
            extraction_confidence: 0.80,
            lines_missing_sku_and_description: 3,
        };
        let choice = choose_extractor(&profile, Some(&outcome), &generous_budget(), false);
        assert!(matches!(
            choice,
            ExtractorChoice::RuleThenLlm { llm: LlmKind::Text, .. }
        ));
    }

    #[test]
    fn operator_retry_bypasses_trigger_rule_but_not_budget_gate() {
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 0.9,
            text_chars_total: 4000,
            page_count: 3,
        };
        let outcome = RuleExtractionOutcome {
            line_count: 4,
            extraction_confidence: 0.85,
            lines_missing_sku_and_description: 0,
        };
        // Trigger rule alone would keep RuleOnly; operator retry forces an LLM attempt.
        let choice = choose_extractor(&profile, Some(&outcome), &generous_budget(), true);
        assert!(matches!(choice, ExtractorChoice::RuleThenLlm { .. }));

        // But an exhausted daily budget still aborts it.
        let tight_budget = BudgetGateInputs {
            tenant_daily_budget_exhausted: true,
            ..generous_budget()
        };
        let choice = choose_extractor(&profile, Some(&outcome), &tight_budget, true);
        assert_eq!(
            choice,
            ExtractorChoice::LlmAborted {
                rule: RuleExtractorKind::PdfText,
                reason: BudgetAbortReason::DailyBudgetExhausted,
            }
        );
    }

    #[test]
    fn page_count_over_cap_aborts_before_token_estimate() {
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 0.01,
            text_chars_total: 50,
            page_count: 100,
        };
        let budget = BudgetGateInputs {
            max_page_count: 10,
            ..generous_budget()
        };
        let choice = choose_extractor(&profile, None, &budget, false);
        assert_eq!(
            choice,
            ExtractorChoice::LlmAborted {
                rule: RuleExtractorKind::PdfText,
                reason: BudgetAbortReason::PageCountExceeded,
            }
        );
    }

    #[test]
    fn token_estimate_over_cap_aborts() {
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 0.9,
            text_chars_total: 100_000,
            page_count: 3,
        };
        let outcome = RuleExtractionOutcome {
            line_count: 0,
            extraction_confidence: 0.0,
            lines_missing_sku_and_description: 0,
        };
        let budget = BudgetGateInputs {
            max_tokens_per_call: 1000,
            ..generous_budget()
        };
        let choice = choose_extractor(&profile, Some(&outcome), &budget, false);
        assert_eq!(
            choice,
            ExtractorChoice::LlmAborted {
                rule: RuleExtractorKind::PdfText,
                reason: BudgetAbortReason::TokenEstimateExceeded,
            }
        );
    }

    #[test]
    fn token_estimate_formulas_match_spec() {
        assert_eq!(estimate_text_tokens(0), 0);
        assert_eq!(estimate_text_tokens(1), 1);
        assert_eq!(estimate_text_tokens(4), 1);
        assert_eq!(estimate_text_tokens(5), 2);
        assert_eq!(estimate_vision_tokens(1), 1500);
        assert_eq!(estimate_vision_tokens(2), 3000);
    }

    #[test]
    fn zero_lines_from_rule_escalates_even_with_decent_confidence_field() {
        let profile = DocumentProfile {
            media_kind: DocumentMediaKind::Pdf,
            text_coverage_ratio: 0.9,
            text_chars_total: 4000,
            page_count: 3,
        };
        let outcome = RuleExtractionOutcome {
            line_count: 0,
            extraction_confidence: 0.99,
            lines_missing_sku_and_description: 0,
        };
        let choice = choose_extractor(&profile, Some(&outcome), &generous_budget(), false);
        assert!(matches!(choice, ExtractorChoice::RuleThenLlm { .. }));
    }
}
