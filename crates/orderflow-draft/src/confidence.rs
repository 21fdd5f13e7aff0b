// SPDX-License-Identifier: MIT OR Apache-2.0
//! Confidence aggregation formulas (§4.11): extraction, customer,
//! matching, and overall confidence.

use orderflow_core::clamp01;

/// Per-field header confidences feeding `header_score`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderFieldConfidences {
    /// Confidence for `external_order_number`.
    pub external_order_number: f64,
    /// Confidence for `order_date`.
    pub order_date: f64,
    /// Confidence for `currency`.
    pub currency: f64,
    /// Confidence for `customer_hint`.
    pub customer_hint: f64,
    /// Confidence for `requested_delivery_date`.
    pub requested_delivery_date: f64,
    /// Confidence for `ship_to`.
    pub ship_to: f64,
}

/// `header_score`: weighted average of per-field header confidences
/// (§4.11 weights).
#[must_use]
pub fn header_score(fields: &HeaderFieldConfidences) -> f64 {
    0.20 * fields.external_order_number
        + 0.15 * fields.order_date
        + 0.20 * fields.currency
        + 0.25 * fields.customer_hint
        + 0.10 * fields.requested_delivery_date
        + 0.10 * fields.ship_to
}

/// Per-field line confidences feeding one line's weighted average.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFieldConfidences {
    /// Confidence for the customer SKU field.
    pub customer_sku: f64,
    /// Confidence for the quantity field.
    pub qty: f64,
    /// Confidence for the UoM field.
    pub uom: f64,
    /// Confidence for the unit price field.
    pub unit_price: f64,
}

/// One line's weighted average (§4.11 weights).
#[must_use]
pub fn line_weighted_average(fields: &LineFieldConfidences) -> f64 {
    0.30 * fields.customer_sku + 0.30 * fields.qty + 0.20 * fields.uom + 0.20 * fields.unit_price
}

/// `line_score`: average over lines of each line's weighted average. `0.0`
/// for an empty draft (the zero-lines penalty below then applies).
#[must_use]
pub fn line_score(lines: &[LineFieldConfidences]) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    let sum: f64 = lines.iter().map(line_weighted_average).sum();
    sum / lines.len() as f64
}

/// Inputs to the extraction-confidence penalty multiplier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionPenaltyInputs {
    /// `true` if the draft has zero lines.
    pub zero_lines: bool,
    /// `true` if text-coverage ratio was below 0.15 and vision wasn't used.
    pub low_text_coverage_without_vision: bool,
    /// `true` if the anchor-check failure rate exceeded 30%.
    pub anchor_failure_rate_exceeded: bool,
}

/// Penalty multiplier (§4.11): `0.60` for zero lines, `0.50` for low text
/// coverage without vision, `0.70` for excessive anchor-check failures.
/// Multiple conditions multiply together.
#[must_use]
pub fn extraction_penalty(inputs: &ExtractionPenaltyInputs) -> f64 {
    let mut penalty = 1.0;
    if inputs.zero_lines {
        penalty *= 0.60;
    }
    if inputs.low_text_coverage_without_vision {
        penalty *= 0.50;
    }
    if inputs.anchor_failure_rate_exceeded {
        penalty *= 0.70;
    }
    penalty
}

/// `extraction_confidence = clamp01((0.40 * header_score + 0.60 * line_score) * penalty)`.
#[must_use]
pub fn extraction_confidence(header_score: f64, line_score: f64, penalty: f64) -> f64 {
    clamp01((0.40 * header_score + 0.60 * line_score) * penalty)
}

/// How the customer was resolved, feeding `customer_confidence`.
#[derive(Debug, Clone, Copy)]
pub enum CustomerResolution {
    /// Auto-selected by the detector; carries its detection score.
    AutoSelected {
        /// The detector's aggregate score for the selected candidate.
        detection_score: f64,
    },
    /// An operator manually selected the customer.
    UserSelected {
        /// The candidate's detection score, if one was offered.
        candidate_score: Option<f64>,
    },
    /// No customer resolved.
    None,
}

/// `customer_confidence` (§4.11).
#[must_use]
pub fn customer_confidence(resolution: CustomerResolution) -> f64 {
    match resolution {
        CustomerResolution::AutoSelected { detection_score } => clamp01(detection_score),
        CustomerResolution::UserSelected { candidate_score } => {
            clamp01(candidate_score.unwrap_or(0.0).max(0.90))
        }
        CustomerResolution::None => 0.0,
    }
}

/// `matching_confidence`: average of per-line `match_confidence`, counting
/// lines without an internal SKU as `0`.
#[must_use]
pub fn matching_confidence(per_line_match_confidence: &[Option<f64>]) -> f64 {
    if per_line_match_confidence.is_empty() {
        return 0.0;
    }
    let sum: f64 = per_line_match_confidence.iter().map(|c| c.unwrap_or(0.0)).sum();
    sum / per_line_match_confidence.len() as f64
}

/// `confidence_score` (overall): `clamp01(0.45*extraction + 0.20*customer + 0.35*matching)`.
#[must_use]
pub fn overall_confidence(extraction: f64, customer: f64, matching: f64) -> f64 {
    clamp01(0.45 * extraction + 0.20 * customer + 0.35 * matching)
}
