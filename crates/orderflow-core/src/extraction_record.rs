// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical extraction record (§6.1) every extractor — rule or LLM —
//! emits. Shared by C5, C6, and C11 so no two components invent their own
//! shape for "what an extractor produced."

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Money;

/// Customer hint fields, collected for the customer detector (§4.8 signal
/// S6) but not authoritative on their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerHint {
    /// Company name as it appears in the document.
    pub name: Option<String>,
    /// Sender or body email address, if found in the document body.
    pub email: Option<String>,
    /// ERP customer number, if found.
    pub erp_customer_number: Option<String>,
}

/// Ship-to address fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShipTo {
    /// Company name.
    pub company: Option<String>,
    /// Street address.
    pub street: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Country.
    pub country: Option<String>,
}

/// Header-level fields extracted from a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderHeader {
    /// The customer's own order number, if present.
    pub external_order_number: Option<String>,
    /// Order date (ISO-8601).
    pub order_date: Option<NaiveDate>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Requested delivery date (ISO-8601), header-level default for lines
    /// that don't override it.
    pub requested_delivery_date: Option<NaiveDate>,
    /// Signals for customer detection; never authoritative.
    pub customer_hint: CustomerHint,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Ship-to address, if present.
    pub ship_to: Option<ShipTo>,
}

/// One extracted order line, before matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractedLine {
    /// Dense 1-based position within the extraction.
    pub line_no: u32,
    /// Raw (un-normalized) customer SKU as it appeared in the source.
    pub customer_sku_raw: Option<String>,
    /// Free-text product description.
    pub product_description: Option<String>,
    /// Quantity ordered.
    pub qty: Option<Money>,
    /// Unit of measure, already mapped to the canonical set where possible.
    pub uom: Option<String>,
    /// Unit price.
    pub unit_price: Option<Money>,
    /// ISO 4217 currency code for `unit_price`, if it differs from the
    /// header currency.
    pub currency: Option<String>,
    /// Per-line delivery date override.
    pub requested_delivery_date: Option<NaiveDate>,
}

/// Per-field confidence scores for the header, keyed by field name.
pub type HeaderConfidence = HashMap<String, f64>;
/// Per-field confidence scores for one line, keyed by field name.
pub type LineConfidence = HashMap<String, f64>;

/// Confidence record accompanying an extraction (§6.1, §4.11).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfidence {
    /// Per-field confidence on the header.
    pub header: HeaderConfidence,
    /// Per-field confidence, one map per line, indexed by `line_no - 1`.
    pub lines: Vec<LineConfidence>,
    /// Aggregate confidence for the whole extraction.
    pub overall: f64,
}

/// One warning surfaced alongside an extraction; does not itself block the
/// draft, but frequently correlates with a [`crate`]-level validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionWarning {
    /// Short machine-readable code, e.g. `"UNKNOWN_UOM"`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// The canonical extraction record (§6.1). Every extractor — `rule_csv`,
/// `rule_xlsx`, `rule_pdf_text`, `llm_text`, `llm_vision` — emits exactly
/// this shape; missing values are `None`, never invented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionRecord {
    /// Header-level fields.
    pub order: OrderHeader,
    /// Extracted lines, densely numbered starting at 1.
    pub lines: Vec<ExtractedLine>,
    /// Confidence record.
    pub confidence: ExtractionConfidence,
    /// Non-fatal warnings raised during extraction.
    pub warnings: Vec<ExtractionWarning>,
    /// Versioned identifier of the extractor that produced this record,
    /// e.g. `"rule_csv_v1"`, `"llm_vision_v1"`.
    pub extractor_version: String,
}

impl ExtractionRecord {
    /// An empty record attributed to `extractor_version`, used when both
    /// the rule and LLM paths fail (§4.4).
    #[must_use]
    pub fn empty(extractor_version: impl Into<String>) -> Self {
        Self {
            extractor_version: extractor_version.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_has_no_lines_and_zero_confidence() {
        let record = ExtractionRecord::empty("rule_csv_v1");
        assert!(record.lines.is_empty());
        assert_eq!(record.confidence.overall, 0.0);
        assert_eq!(record.extractor_version, "rule_csv_v1");
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut record = ExtractionRecord::empty("llm_text_v1");
        record.order.currency = Some("EUR".into());
        record.lines.push(ExtractedLine {
            line_no: 1,
            customer_sku_raw: Some("AB-12".into()),
            ..Default::default()
        });
        let json = serde_json::to_string(&record).expect("serialize");
        let back: ExtractionRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
    }
}
