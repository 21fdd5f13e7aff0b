// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text-PDF rule extractor (`rule_pdf_text_v1`, §4.5).
//!
//! `pdf-extract` gives us a flat text stream with no glyph coordinates, so
//! "vertical gap clustering" is approximated by blank-line runs (a real
//! gap in the rendered page almost always produces a blank text line) and
//! "column-alignment" by runs of two or more whitespace characters, which
//! is how most PDF-to-text layers represent a fixed-width table column gap.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use orderflow_core::{
    default_uom_synonyms, normalize_uom, ExtractedLine, ExtractionConfidence, ExtractionRecord,
    ExtractionWarning,
};
use regex::Regex;

use crate::columns::{map_headers, Column};
use crate::decimal::{detect_column_separator, parse_decimal};

const EXTRACTOR_VERSION: &str = "rule_pdf_text_v1";

static COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}|\t").unwrap());

/// Text coverage / character count pre-analysis for a PDF, used by the
/// router (C4) ahead of extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfTextProfile {
    /// Fraction of page area with an extractable text layer. `pdf-extract`
    /// cannot measure this directly; callers typically derive it from a
    /// separate rendering pass and should treat this field as advisory
    /// when populated from text length alone.
    pub text_coverage_ratio: f64,
    /// Total extracted character count.
    pub text_chars_total: usize,
    /// Page count, from the PDF's page tree.
    pub page_count: u32,
}

/// Split extracted PDF text into row groups, breaking on runs of one or
/// more blank lines ("vertical gap clustering").
fn cluster_into_row_groups(text: &str) -> Vec<Vec<&str>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn split_columns(line: &str) -> Vec<String> {
    COLUMN_GAP.split(line.trim()).map(str::trim).map(str::to_string).collect()
}

/// Extract a canonical [`ExtractionRecord`] from a text-PDF's extracted
/// text layer.
#[must_use]
pub fn extract_pdf_text(text: &str, tenant_synonyms: &HashMap<&str, Column>) -> ExtractionRecord {
    let row_groups = cluster_into_row_groups(text);

    let header_group = row_groups.iter().enumerate().find_map(|(idx, group)| {
        let candidate = split_columns(group[0]);
        let columns = map_headers(&candidate, tenant_synonyms);
        (columns.len() >= 2).then_some((idx, columns))
    });

    let Some((header_group_idx, columns)) = header_group else {
        return ExtractionRecord {
            warnings: vec![ExtractionWarning {
                code: "LOW_CONFIDENCE_EXTRACTION".to_string(),
                message: "no recognizable table header found in PDF text layer".to_string(),
            }],
            extractor_version: EXTRACTOR_VERSION.to_string(),
            ..Default::default()
        };
    };

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for group in &row_groups[header_group_idx + 1..] {
        for line in group {
            raw_rows.push(split_columns(line));
        }
    }

    let qty_sep = columns
        .get(&Column::Qty)
        .map(|&i| detect_column_separator(raw_rows.iter().filter_map(|r| r.get(i)).map(String::as_str)))
        .unwrap_or(crate::decimal::DecimalSeparator::Dot);
    let price_sep = columns
        .get(&Column::UnitPrice)
        .map(|&i| detect_column_separator(raw_rows.iter().filter_map(|r| r.get(i)).map(String::as_str)))
        .unwrap_or(crate::decimal::DecimalSeparator::Dot);

    let uom_synonyms = default_uom_synonyms();
    let mut warnings = Vec::new();
    let mut lines = Vec::with_capacity(raw_rows.len());
    let mut line_confidences = Vec::with_capacity(raw_rows.len());
    let mut line_no = 0u32;

    for row in &raw_rows {
        let get = |col: Column| columns.get(&col).and_then(|&i| row.get(i)).map(String::as_str).filter(|s| !s.is_empty());

        let sku_raw = get(Column::Sku).map(str::to_string);
        let description = get(Column::Description).map(str::to_string);
        let qty = get(Column::Qty).and_then(|v| parse_decimal(v, qty_sep));
        let unit_price = get(Column::UnitPrice).and_then(|v| parse_decimal(v, price_sep));

        if sku_raw.is_none() && description.is_none() && qty.is_none() && unit_price.is_none() {
            continue; // blank/noise row carried over from the page's running text
        }
        line_no += 1;

        let uom = match get(Column::Uom) {
            Some(raw) => match normalize_uom(raw, &uom_synonyms) {
                Some(canonical) => Some(canonical.to_string()),
                None => {
                    warnings.push(ExtractionWarning {
                        code: "UNKNOWN_UOM".to_string(),
                        message: format!("line {line_no}: unrecognized unit of measure '{raw}'"),
                    });
                    None
                }
            },
            None => None,
        };

        let mut field_confidence = HashMap::new();
        field_confidence.insert("customer_sku".to_string(), if sku_raw.is_some() { 0.80 } else { 0.0 });
        field_confidence.insert("qty".to_string(), if qty.is_some() { 0.80 } else { 0.0 });
        field_confidence.insert("uom".to_string(), if uom.is_some() { 0.75 } else { 0.0 });
        field_confidence.insert("unit_price".to_string(), if unit_price.is_some() { 0.75 } else { 0.0 });
        line_confidences.push(field_confidence);

        lines.push(ExtractedLine {
            line_no,
            customer_sku_raw: sku_raw,
            product_description: description,
            qty,
            uom,
            unit_price,
            currency: None,
            requested_delivery_date: None,
        });
    }

    let line_score = if line_confidences.is_empty() {
        0.0
    } else {
        line_confidences
            .iter()
            .map(|c| {
                0.30 * c.get("customer_sku").copied().unwrap_or(0.0)
                    + 0.30 * c.get("qty").copied().unwrap_or(0.0)
                    + 0.20 * c.get("uom").copied().unwrap_or(0.0)
                    + 0.20 * c.get("unit_price").copied().unwrap_or(0.0)
            })
            .sum::<f64>()
            / line_confidences.len() as f64
    };

    ExtractionRecord {
        order: Default::default(),
        lines,
        confidence: ExtractionConfidence {
            header: HashMap::new(),
            lines: line_confidences,
            overall: orderflow_core::clamp01(line_score),
        },
        warnings,
        extractor_version: EXTRACTOR_VERSION.to_string(),
    }
}
