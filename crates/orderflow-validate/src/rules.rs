// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pure rule evaluation against a draft snapshot (§4.10). Each rule is a
//! small function from snapshot fields to an optional finding; the caller
//! never needs the full `DraftOrder`/`DraftOrderLine` types, only the
//! handful of fields each rule inspects, so this crate has no dependency
//! on `orderflow-draft`.

use orderflow_core::{CustomerId, DraftOrderId, DraftOrderLineId, Money};

use crate::issue::IssueType;

/// Confidence below which `LOW_CONFIDENCE_EXTRACTION` is raised.
pub const LOW_CONFIDENCE_EXTRACTION_THRESHOLD: f64 = 0.60;
/// Confidence below which `LOW_CONFIDENCE_MATCH` is raised (§4.9).
pub const LOW_CONFIDENCE_MATCH_THRESHOLD: f64 = 0.75;

/// Header-level fields the validator inspects.
#[derive(Debug, Clone)]
pub struct HeaderSnapshot {
    /// The draft these findings attach to.
    pub draft_id: DraftOrderId,
    /// Resolved customer, if any.
    pub customer_id: Option<CustomerId>,
    /// `true` once a currency has been resolved.
    pub currency_set: bool,
    /// `true` if customer detection did not clear the auto-select gate.
    pub customer_ambiguous: bool,
    /// Header extraction confidence.
    pub extraction_confidence: f64,
    /// `true` if the LLM output for the header failed parsing/guards.
    pub llm_output_invalid: bool,
}

/// Line-level fields the validator inspects.
#[derive(Debug, Clone)]
pub struct LineSnapshot {
    /// The line these findings attach to.
    pub line_id: DraftOrderLineId,
    /// Raw customer SKU text, if any was extracted.
    pub customer_sku_raw: Option<String>,
    /// Extracted quantity, if any.
    pub qty: Option<Money>,
    /// Extracted UoM text, if any.
    pub uom_raw: Option<String>,
    /// `true` if `uom_raw` normalized to a canonical UoM.
    pub uom_recognized: bool,
    /// Internal SKU resolved by the matcher, if any.
    pub internal_sku: Option<String>,
    /// Extracted unit price, if any.
    pub unit_price: Option<Money>,
    /// `true` if this line duplicates an earlier line in the same draft.
    pub is_duplicate: bool,
    /// Line extraction confidence.
    pub extraction_confidence: f64,
    /// Match confidence, if a match was attempted.
    pub match_confidence: Option<f64>,
    /// `true` if the matched product's UoM is incompatible with the
    /// line's UoM.
    pub uom_incompatible_with_match: bool,
    /// `true` if the stated unit price differs from catalog beyond
    /// tolerance.
    pub price_mismatch: bool,
    /// `true` if the line's LLM output failed parsing/guards.
    pub llm_output_invalid: bool,
}

/// Evaluate every header rule, in vocabulary order.
#[must_use]
pub fn evaluate_header(header: &HeaderSnapshot) -> Vec<(IssueType, String)> {
    let mut findings = Vec::new();
    if header.customer_id.is_none() && !header.customer_ambiguous {
        findings.push((IssueType::MissingCustomer, "no customer resolved".to_string()));
    }
    if !header.currency_set {
        findings.push((IssueType::MissingCurrency, "no currency resolved".to_string()));
    }
    if header.customer_ambiguous {
        findings.push((
            IssueType::CustomerAmbiguous,
            "customer detection did not clear the auto-select gate".to_string(),
        ));
    }
    if header.extraction_confidence < LOW_CONFIDENCE_EXTRACTION_THRESHOLD {
        findings.push((
            IssueType::LowConfidenceExtraction,
            format!("header extraction confidence {:.2}", header.extraction_confidence),
        ));
    }
    if header.llm_output_invalid {
        findings.push((IssueType::LlmOutputInvalid, "header LLM output invalid".to_string()));
    }
    findings
}

/// Evaluate every line rule, in vocabulary order.
#[must_use]
pub fn evaluate_line(line: &LineSnapshot) -> Vec<(IssueType, String)> {
    let mut findings = Vec::new();

    match &line.customer_sku_raw {
        None => findings.push((IssueType::MissingSku, "no customer SKU present".to_string())),
        Some(_) if line.internal_sku.is_none() => {
            findings.push((IssueType::UnknownProduct, "SKU did not resolve to a catalog product".to_string()));
        }
        Some(_) => {}
    }

    match line.qty {
        None => findings.push((IssueType::MissingQty, "no quantity present".to_string())),
        Some(qty) if qty <= Money::ZERO => {
            findings.push((IssueType::InvalidQty, format!("quantity {qty} is not positive")));
        }
        Some(_) => {}
    }

    match &line.uom_raw {
        None => findings.push((IssueType::MissingUom, "no unit of measure present".to_string())),
        Some(raw) if !line.uom_recognized => {
            findings.push((IssueType::UnknownUom, format!("unit of measure '{raw}' not recognized")));
        }
        Some(_) if line.uom_incompatible_with_match => {
            findings.push((
                IssueType::UomIncompatible,
                "unit of measure incompatible with matched product".to_string(),
            ));
        }
        Some(_) => {}
    }

    if line.unit_price.is_none() {
        findings.push((IssueType::MissingPrice, "no unit price present".to_string()));
    } else if line.price_mismatch {
        findings.push((
            IssueType::PriceMismatch,
            "stated unit price differs from catalog price beyond tolerance".to_string(),
        ));
    }

    if line.is_duplicate {
        findings.push((IssueType::DuplicateLine, "duplicates an earlier line in this draft".to_string()));
    }

    if line.extraction_confidence < LOW_CONFIDENCE_EXTRACTION_THRESHOLD {
        findings.push((
            IssueType::LowConfidenceExtraction,
            format!("line extraction confidence {:.2}", line.extraction_confidence),
        ));
    }

    if let Some(match_confidence) = line.match_confidence {
        if match_confidence < LOW_CONFIDENCE_MATCH_THRESHOLD {
            findings.push((IssueType::LowConfidenceMatch, format!("match confidence {match_confidence:.2}")));
        }
    }

    if line.llm_output_invalid {
        findings.push((IssueType::LlmOutputInvalid, "line LLM output invalid".to_string()));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_line() -> LineSnapshot {
        LineSnapshot {
            line_id: DraftOrderLineId::new(),
            customer_sku_raw: Some("AB-12".to_string()),
            qty: Some(Money::from(10)),
            uom_raw: Some("ST".to_string()),
            uom_recognized: true,
            internal_sku: Some("INT-999".to_string()),
            unit_price: Some(Money::new(123, 2)),
            is_duplicate: false,
            extraction_confidence: 0.95,
            match_confidence: Some(0.99),
            uom_incompatible_with_match: false,
            price_mismatch: false,
            llm_output_invalid: false,
        }
    }

    #[test]
    fn clean_line_raises_nothing() {
        assert!(evaluate_line(&base_line()).is_empty());
    }

    #[test]
    fn missing_sku_suppresses_unknown_product() {
        let mut line = base_line();
        line.customer_sku_raw = None;
        line.internal_sku = None;
        let findings = evaluate_line(&line);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].0, IssueType::MissingSku);
    }

    #[test]
    fn unresolved_sku_raises_unknown_product() {
        let mut line = base_line();
        line.internal_sku = None;
        let findings = evaluate_line(&line);
        assert!(findings.iter().any(|(t, _)| *t == IssueType::UnknownProduct));
    }

    #[test]
    fn zero_qty_is_invalid_not_missing() {
        let mut line = base_line();
        line.qty = Some(Money::ZERO);
        let findings = evaluate_line(&line);
        assert!(findings.iter().any(|(t, _)| *t == IssueType::InvalidQty));
        assert!(!findings.iter().any(|(t, _)| *t == IssueType::MissingQty));
    }

    #[test]
    fn low_match_confidence_below_threshold_raises_warning() {
        let mut line = base_line();
        line.match_confidence = Some(0.74);
        let findings = evaluate_line(&line);
        assert!(findings.iter().any(|(t, _)| *t == IssueType::LowConfidenceMatch));
    }

    #[test]
    fn ambiguous_customer_suppresses_missing_customer() {
        let header = HeaderSnapshot {
            draft_id: DraftOrderId::new(),
            customer_id: None,
            currency_set: true,
            customer_ambiguous: true,
            extraction_confidence: 0.95,
            llm_output_invalid: false,
        };
        let findings = evaluate_header(&header);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].0, IssueType::CustomerAmbiguous);
    }
}
