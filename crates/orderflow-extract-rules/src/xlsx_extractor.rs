// SPDX-License-Identifier: MIT OR Apache-2.0
//! XLSX rule extractor (`rule_xlsx_v1`, §4.5).

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use orderflow_core::{
    default_uom_synonyms, normalize_uom, ExtractedLine, ExtractionConfidence, ExtractionRecord,
    ExtractionWarning,
};

use crate::columns::{map_headers, Column};
use crate::decimal::{parse_decimal, DecimalSeparator};

const EXTRACTOR_VERSION: &str = "rule_xlsx_v1";

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(d) => Some(d.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

/// A row qualifies as a header row when it has at least 3 non-empty string
/// cells and the following row has no formula-evaluated numeric result in
/// the same position (i.e. isn't itself a second header/total row of pure
/// numbers).
fn looks_like_header(row: &[Data]) -> bool {
    row.iter()
        .filter(|c| matches!(c, Data::String(s) if !s.trim().is_empty()))
        .count()
        >= 3
}

/// Extract a canonical [`ExtractionRecord`] from XLSX bytes (first sheet
/// only).
#[must_use]
pub fn extract_xlsx(bytes: &[u8], tenant_synonyms: &HashMap<&str, Column>) -> ExtractionRecord {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = match open_workbook_from_rs(cursor) {
        Ok(w) => w,
        Err(_) => return no_header_record("XLSX_UNREADABLE", "could not open workbook"),
    };
    let sheet_name = match workbook.sheet_names().first().cloned() {
        Some(name) => name,
        None => return no_header_record("XLSX_NO_SHEET", "workbook has no sheets"),
    };
    let range = match workbook.worksheet_range(&sheet_name) {
        Ok(r) => r,
        Err(_) => return no_header_record("XLSX_NO_SHEET", "could not read first sheet"),
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.find(|r| looks_like_header(r)) else {
        return no_header_record("XLSX_NO_HEADER", "no header row found");
    };
    let raw_headers: Vec<String> = header_row
        .iter()
        .map(|c| cell_to_string(c).unwrap_or_default())
        .collect();
    let columns = map_headers(&raw_headers, tenant_synonyms);

    let data_rows: Vec<Vec<Data>> = rows.map(<[Data]>::to_vec).collect();

    let uom_synonyms = default_uom_synonyms();
    let mut warnings = Vec::new();
    let mut lines = Vec::with_capacity(data_rows.len());
    let mut line_confidences = Vec::with_capacity(data_rows.len());

    for (idx, row) in data_rows.iter().enumerate() {
        let get = |col: Column| {
            columns
                .get(&col)
                .and_then(|&i| row.get(i))
                .and_then(cell_to_string)
                .filter(|s| !s.trim().is_empty())
        };

        let sku_raw = get(Column::Sku);
        let description = get(Column::Description);
        // XLSX numeric cells already carry a `.` decimal point regardless
        // of locale display formatting, so no per-column detection needed.
        let qty = get(Column::Qty).and_then(|v| parse_decimal(&v, DecimalSeparator::Dot));
        let unit_price = get(Column::UnitPrice).and_then(|v| parse_decimal(&v, DecimalSeparator::Dot));

        let uom = match get(Column::Uom) {
            Some(raw) => match normalize_uom(&raw, &uom_synonyms) {
                Some(canonical) => Some(canonical.to_string()),
                None => {
                    warnings.push(ExtractionWarning {
                        code: "UNKNOWN_UOM".to_string(),
                        message: format!("line {}: unrecognized unit of measure '{raw}'", idx + 1),
                    });
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

fn no_header_record(code: &str, message: &str) -> ExtractionRecord {
    ExtractionRecord {
        warnings: vec![ExtractionWarning {
            code: code.to_string(),
            message: message.to_string(),
        }],
        extractor_version: EXTRACTOR_VERSION.to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_detection_requires_three_non_empty_string_cells() {
        let row = vec![
            Data::String("Artikelnummer".into()),
            Data::String("Menge".into()),
            Data::String("Einheit".into()),
        ];
        assert!(looks_like_header(&row));

        let numeric_row = vec![Data::Float(1.0), Data::Float(2.0), Data::Float(3.0)];
        assert!(!looks_like_header(&numeric_row));
    }

    #[test]
    fn cell_to_string_covers_common_variants() {
        assert_eq!(cell_to_string(&Data::String("x".into())), Some("x".to_string()));
        assert_eq!(cell_to_string(&Data::Float(1.5)), Some("1.5".to_string()));
        assert_eq!(cell_to_string(&Data::Empty), None);
    }
}
