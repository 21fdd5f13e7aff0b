// SPDX-License-Identifier: MIT OR Apache-2.0
//! The parse-and-guard pipeline (§4.6), run in fixed order over raw LLM
//! output.

use orderflow_core::{default_uom_synonyms, normalize_uom, ExtractedLine, ExtractionRecord, ExtractionWarning, Money};
use orderflow_error::{ErrorCode, OrderFlowError, Result};
use orderflow_ports::{LlmProviderPort, ProviderContext};

use crate::guards::{check_anchor, check_density_tripped, check_range, DEFAULT_MAX_QTY, GUARD_TRIPPED_OVERALL_CAP};
use crate::templates::PromptTemplate;

/// Default maximum line count a normalized extraction is capped to
/// (§4.6 step 4).
pub const DEFAULT_MAX_LINE_COUNT: usize = 500;

/// Step 1: the first non-whitespace character of `raw` must be `{`.
#[must_use]
pub fn has_json_object_prefix(raw: &str) -> bool {
    raw.trim_start().starts_with('{')
}

/// Steps 1–2: strip, validate the `{` prefix, decode JSON, and — on a
/// decode failure — attempt exactly one repair via `json_repair_v1`.
/// A second failure surfaces [`ErrorCode::LlmOutputInvalid`].
pub async fn decode_with_repair(
    raw: &str,
    provider: &dyn LlmProviderPort,
    context: &ProviderContext,
) -> Result<serde_json::Value> {
    if !has_json_object_prefix(raw) {
        return Err(OrderFlowError::new(ErrorCode::LlmOutputInvalid, "output does not start with '{'")
            .with_context("template", PromptTemplate::JsonRepairV1.id()));
    }

    match serde_json::from_str::<serde_json::Value>(raw.trim_start()) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            let repaired = provider
                .repair_json(raw, &first_error.to_string(), context)
                .await
                .map_err(|_| OrderFlowError::new(ErrorCode::LlmOutputInvalid, "json repair call failed"))?;
            serde_json::from_str::<serde_json::Value>(repaired.trim_start()).map_err(|second_error| {
                OrderFlowError::new(ErrorCode::LlmOutputInvalid, "output unparseable after one repair attempt")
                    .with_source(second_error)
            })
        }
    }
}

/// Step 3: validate against the closed schema — unknown keys and wrong
/// types are rejected by `ExtractionRecord`'s `deny_unknown_fields`
/// derive, so this is a direct typed deserialization.
pub fn validate_schema(value: serde_json::Value) -> Result<ExtractionRecord> {
    serde_json::from_value(value)
        .map_err(|e| OrderFlowError::new(ErrorCode::LlmOutputInvalid, "schema validation failed").with_source(e))
}

/// Step 4: normalize UoM to the canonical set, renumber lines densely
/// starting at 1, and cap the line count.
pub fn normalize(mut record: ExtractionRecord, max_line_count: usize) -> ExtractionRecord {
    if record.lines.len() > max_line_count {
        record.warnings.push(ExtractionWarning {
            code: "LINE_COUNT_CAPPED".to_string(),
            message: format!("truncated from {} to {max_line_count} lines", record.lines.len()),
        });
        record.lines.truncate(max_line_count);
    }

    let uom_synonyms = default_uom_synonyms();
    for (index, line) in record.lines.iter_mut().enumerate() {
        line.line_no = (index + 1) as u32;
        if let Some(raw_uom) = line.uom.clone() {
            line.uom = normalize_uom(&raw_uom, &uom_synonyms).map(|u| u.as_str().to_string());
        }
    }

    record
}

/// Result of running the hallucination guards over a normalized record.
#[derive(Debug, Clone)]
pub struct GuardReport {
    /// `true` if any guard triggered anywhere in the record.
    pub any_triggered: bool,
    /// Zero-based indices of lines that failed the anchor guard.
    pub anchor_failed_lines: Vec<usize>,
    /// Zero-based indices of lines whose quantity failed the range guard
    /// and was nulled out.
    pub range_failed_lines: Vec<usize>,
    /// `true` if the density guard tripped.
    pub density_tripped: bool,
}

/// Step 5: run the anchor, range, and density guards, mutating the
/// record in place (halving anchor-failed confidences, nulling
/// out-of-range quantities) and returning a report of what tripped.
#[must_use]
pub fn apply_guards(record: &mut ExtractionRecord, source_text: &str, page_count: u32) -> GuardReport {
    let mut anchor_failed_lines = Vec::new();
    let mut range_failed_lines = Vec::new();

    for (index, line) in record.lines.iter_mut().enumerate() {
        if !check_anchor(line, source_text).anchored {
            anchor_failed_lines.push(index);
            if let Some(confidences) = record.confidence.lines.get_mut(index) {
                for value in confidences.values_mut() {
                    *value /= 2.0;
                }
            }
        }

        if let Some(qty) = line.qty {
            if !check_range(qty, DEFAULT_MAX_QTY) {
                range_failed_lines.push(index);
                line.qty = None;
                record.warnings.push(ExtractionWarning {
                    code: "QTY_OUT_OF_RANGE".to_string(),
                    message: format!("line {}: quantity {qty} out of plausible range", index + 1),
                });
            }
        }
    }

    let density_tripped = check_density_tripped(record.lines.len(), page_count);
    if density_tripped {
        record.confidence.overall *= 0.7;
        record.warnings.push(ExtractionWarning {
            code: "HIGH_LINE_DENSITY".to_string(),
            message: "line count is high relative to page count".to_string(),
        });
    }

    let any_triggered = !anchor_failed_lines.is_empty() || !range_failed_lines.is_empty() || density_tripped;

    // Step 6: if any guard triggered, cap confidence.overall.
    if any_triggered {
        record.confidence.overall = record.confidence.overall.min(GUARD_TRIPPED_OVERALL_CAP);
    }

    GuardReport { any_triggered, anchor_failed_lines, range_failed_lines, density_tripped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::{ExtractionConfidence, OrderHeader};
    use std::collections::HashMap;

    fn record_with_line(qty: Option<Money>, sku: Option<&str>) -> ExtractionRecord {
        let mut record = ExtractionRecord {
            order: OrderHeader::default(),
            lines: vec![ExtractedLine {
                line_no: 1,
                customer_sku_raw: sku.map(str::to_string),
                product_description: Some("Sechskantschrauben".to_string()),
                qty,
                uom: Some("Stk".to_string()),
                unit_price: None,
                currency: None,
                requested_delivery_date: None,
            }],
            confidence: ExtractionConfidence {
                header: HashMap::new(),
                lines: vec![HashMap::from([("customer_sku".to_string(), 0.9)])],
                overall: 0.9,
            },
            warnings: vec![],
            extractor_version: "llm_text_v1".to_string(),
        };
        record.lines[0].uom = Some("Stk".to_string());
        record
    }

    #[test]
    fn json_prefix_check() {
        assert!(has_json_object_prefix("   {\"a\":1}"));
        assert!(!has_json_object_prefix("not json"));
        assert!(!has_json_object_prefix("[1,2,3]"));
    }

    #[test]
    fn schema_validation_rejects_unknown_keys() {
        let value = serde_json::json!({
            "order": {},
            "lines": [],
            "confidence": {"header": {}, "lines": [], "overall": 0.0},
            "warnings": [],
            "extractor_version": "llm_text_v1",
            "not_a_real_field": true
        });
        assert!(validate_schema(value).is_err());
    }

    #[test]
    fn schema_validation_accepts_well_formed_record() {
        let value = serde_json::json!({
            "order": {"external_order_number": null, "order_date": null, "currency": "EUR", "requested_delivery_date": null, "customer_hint": {"name": null, "email": null, "erp_customer_number": null}, "notes": null, "ship_to": null},
            "lines": [],
            "confidence": {"header": {}, "lines": [], "overall": 0.5},
            "warnings": [],
            "extractor_version": "llm_text_v1"
        });
        let record = validate_schema(value).unwrap();
        assert_eq!(record.order.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn normalize_renumbers_and_maps_uom() {
        let mut record = record_with_line(Some(Money::from(1)), Some("AB-12"));
        record.lines.push(record.lines[0].clone());
        record.lines[1].line_no = 99;
        let normalized = normalize(record, DEFAULT_MAX_LINE_COUNT);
        assert_eq!(normalized.lines[0].line_no, 1);
        assert_eq!(normalized.lines[1].line_no, 2);
        assert_eq!(normalized.lines[0].uom.as_deref(), Some("ST"));
    }

    #[test]
    fn normalize_caps_line_count_and_warns() {
        let mut record = record_with_line(Some(Money::from(1)), Some("AB-12"));
        record.lines = vec![record.lines[0].clone(); 5];
        let normalized = normalize(record, 3);
        assert_eq!(normalized.lines.len(), 3);
        assert!(normalized.warnings.iter().any(|w| w.code == "LINE_COUNT_CAPPED"));
    }

    #[test]
    fn anchor_guard_halves_confidence_on_failure() {
        let mut record = record_with_line(Some(Money::from(1)), Some("ZZ-NOTINTEXT"));
        let report = apply_guards(&mut record, "this text mentions nothing relevant at all", 1);
        assert_eq!(report.anchor_failed_lines, vec![0]);
        assert!(record.confidence.lines[0]["customer_sku"] < 0.9);
        assert!(report.any_triggered);
        assert!(record.confidence.overall <= GUARD_TRIPPED_OVERALL_CAP);
    }

    #[test]
    fn range_guard_nulls_out_of_range_qty() {
        let mut record = record_with_line(Some(Money::from(5_000_000)), Some("AB-12"));
        let report = apply_guards(&mut record, "AB-12 Sechskantschrauben", 1);
        assert_eq!(report.range_failed_lines, vec![0]);
        assert!(record.lines[0].qty.is_none());
    }

    #[test]
    fn density_guard_trips_and_multiplies_overall() {
        let mut record = record_with_line(Some(Money::from(1)), Some("AB-12"));
        record.lines = vec![record.lines[0].clone(); 201];
        record.confidence.overall = 0.9;
        let report = apply_guards(&mut record, "AB-12 Sechskantschrauben", 1);
        assert!(report.density_tripped);
        assert!(record.confidence.overall <= GUARD_TRIPPED_OVERALL_CAP);
    }

    #[test]
    fn clean_record_triggers_no_guards() {
        let mut record = record_with_line(Some(Money::from(1)), Some("AB-12"));
        record.confidence.overall = 0.95;
        let report = apply_guards(&mut record, "Bestellung AB-12 Sechskantschrauben Menge 1", 3);
        assert!(!report.any_triggered);
        assert_eq!(record.confidence.overall, 0.95);
    }
}
