// SPDX-License-Identifier: MIT OR Apache-2.0
//! CSV rule extractor (`rule_csv_v1`, §4.5).

use std::collections::HashMap;

use orderflow_core::{
    default_uom_synonyms, normalize_uom, ExtractedLine, ExtractionConfidence, ExtractionRecord,
    ExtractionWarning,
};

use crate::columns::{default_header_synonyms, map_headers, Column};
use crate::decimal::{detect_column_separator, parse_decimal};

const EXTRACTOR_VERSION: &str = "rule_csv_v1";
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Auto-detect the delimiter among `,`, `;`, `\t` by header-row entropy:
/// whichever delimiter splits the first line into the most fields wins,
/// ties broken by the order above.
#[must_use]
pub fn detect_delimiter(first_line: &str) -> u8 {
    // `max_by_key` keeps the *last* maximal element on a tie, so iterate in
    // reverse to make the earliest candidate in `CANDIDATE_DELIMITERS` win.
    CANDIDATE_DELIMITERS
        .into_iter()
        .rev()
        .max_by_key(|&d| first_line.matches(d as char).count())
        .unwrap_or(b',')
}

/// Extract a canonical [`ExtractionRecord`] from CSV bytes.
///
/// Returns a record with zero lines and a `CSV_NO_HEADER` warning if the
/// input is empty or has no header row.
#[must_use]
pub fn extract_csv(bytes: &[u8], tenant_synonyms: &HashMap<&str, Column>) -> ExtractionRecord {
    let text = String::from_utf8_lossy(bytes);
    let mut warnings = Vec::new();
    let Some(first_line) = text.lines().next() else {
        return no_header_record(vec![warning("CSV_NO_HEADER", "input is empty")]);
    };
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let Ok(header_record) = reader.headers().cloned() else {
        return no_header_record(vec![warning("CSV_NO_HEADER", "could not read header row")]);
    };
    let raw_headers: Vec<String> = header_record.iter().map(str::to_string).collect();
    let columns = map_headers(&raw_headers, tenant_synonyms);

    let rows: Vec<csv::StringRecord> = reader.records().filter_map(Result::ok).collect();

    let qty_sep = columns
        .get(&Column::Qty)
        .map(|&idx| detect_column_separator(rows.iter().filter_map(|r| r.get(idx))))
        .unwrap_or(crate::decimal::DecimalSeparator::Dot);
    let price_sep = columns
        .get(&Column::UnitPrice)
        .map(|&idx| detect_column_separator(rows.iter().filter_map(|r| r.get(idx))))
        .unwrap_or(crate::decimal::DecimalSeparator::Dot);

    let uom_synonyms = default_uom_synonyms();
    let mut lines = Vec::with_capacity(rows.len());
    let mut line_confidences = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let get = |col: Column| columns.get(&col).and_then(|&i| row.get(i)).map(str::trim);

        let sku_raw = get(Column::Sku).filter(|s| !s.is_empty()).map(str::to_string);
        let description = get(Column::Description)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let qty = get(Column::Qty).and_then(|v| parse_decimal(v, qty_sep));
        let unit_price = get(Column::UnitPrice).and_then(|v| parse_decimal(v, price_sep));

        let uom_raw = get(Column::Uom).filter(|s| !s.is_empty());
        let uom = match uom_raw {
            Some(raw) => match normalize_uom(raw, &uom_synonyms) {
                Some(canonical) => Some(canonical.to_string()),
                None => {
                    warnings.push(warning(
                        "UNKNOWN_UOM",
                        format!("line {}: unrecognized unit of measure '{raw}'", idx + 1),
                    ));
                    None
                }
            },
            None => None,
        };

        let mut field_confidence = HashMap::new();
        field_confidence.insert("customer_sku".to_string(), if sku_raw.is_some() { 0.95 } else { 0.0 });
        field_confidence.insert("qty".to_string(), if qty.is_some() { 0.95 } else { 0.0 });
        field_confidence.insert("uom".to_string(), if uom.is_some() { 0.9 } else { 0.0 });
        field_confidence.insert("unit_price".to_string(), if unit_price.is_some() { 0.9 } else { 0.0 });
        line_confidences.push(field_confidence);

        lines.push(ExtractedLine {
            line_no: (idx + 1) as u32,
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

fn no_header_record(warnings: Vec<ExtractionWarning>) -> ExtractionRecord {
    ExtractionRecord {
        warnings,
        extractor_version: EXTRACTOR_VERSION.to_string(),
        ..Default::default()
    }
}

fn warning(code: &str, message: impl Into<String>) -> ExtractionWarning {
    ExtractionWarning {
        code: code.to_string(),
        message: message.into(),
    }
}
