// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rule Extractors (C5): CSV, XLSX, and text-PDF parsers that all emit the
//! canonical extraction record (§4.5, §6.1).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Header synonym table shared by the tabular extractors.
pub mod columns;
/// CSV extractor.
pub mod csv_extractor;
/// Decimal separator detection and parsing.
pub mod decimal;
/// Text-PDF extractor.
pub mod pdf_text_extractor;
/// XLSX extractor.
pub mod xlsx_extractor;

pub use columns::{default_header_synonyms, map_headers, Column};
pub use csv_extractor::extract_csv;
pub use decimal::{detect_column_separator, parse_decimal, DecimalSeparator};
pub use pdf_text_extractor::{extract_pdf_text, PdfTextProfile};
pub use xlsx_extractor::extract_xlsx;

use orderflow_extract_router::DocumentProfile;

/// Extract the text layer and page count from a PDF using `pdf-extract`,
/// and derive a [`PdfTextProfile`] from it.
///
/// `pdf-extract` does not expose per-page rendered area, so
/// `text_coverage_ratio` is approximated as `min(1.0, text_chars_total /
/// (2000 * page_count))` — roughly 2000 characters of dense body text per
/// page — which is conservative enough to route genuinely sparse scans to
/// the vision LLM per the router's trigger rule (§4.4).
///
/// # Errors
/// Returns the underlying `pdf-extract` error on a malformed PDF.
pub fn extract_pdf_text_layer(bytes: &[u8]) -> Result<(String, PdfTextProfile), pdf_extract::OutputError> {
    let text = pdf_extract::extract_text_from_mem(bytes)?;
    let page_count = count_pages(bytes).max(1);
    let text_chars_total = text.chars().count();
    let coverage = (text_chars_total as f64 / (2000.0 * page_count as f64)).min(1.0);
    Ok((
        text,
        PdfTextProfile {
            text_coverage_ratio: coverage,
            text_chars_total,
            page_count,
        },
    ))
}

/// Best-effort page count from a raw PDF byte stream, by counting
/// `/Type /Page` object markers. `pdf-extract` does not expose a direct
/// page-count accessor from in-memory bytes.
fn count_pages(bytes: &[u8]) -> u32 {
    let needle = b"/Type/Page";
    let needle_spaced = b"/Type /Page";
    let mut count = 0u32;
    let mut i = 0;
    while i + needle.len() <= bytes.len() {
        if &bytes[i..i + needle.len()] == needle || bytes[i..].starts_with(needle_spaced) {
            count += 1;
        }
        i += 1;
    }
    count
}

/// Convert a [`PdfTextProfile`] into the [`DocumentProfile`] the router
/// expects.
#[must_use]
pub fn pdf_profile_to_document_profile(profile: PdfTextProfile) -> DocumentProfile {
    DocumentProfile {
        media_kind: orderflow_extract_router::DocumentMediaKind::Pdf,
        text_coverage_ratio: profile.text_coverage_ratio,
        text_chars_total: profile.text_chars_total,
        page_count: profile.page_count,
    }
}
