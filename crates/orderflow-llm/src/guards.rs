// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hallucination guards applied to normalized LLM output (§4.6 step 5):
//! anchor, range, and density.

use orderflow_core::{ExtractedLine, Money};

/// Default maximum plausible quantity (§4.6 range guard).
pub const DEFAULT_MAX_QTY: Money = Money::from_parts(1_000_000, 0, 0, false, 0);

/// Default line-count / page-count thresholds for the density guard.
pub const DENSITY_LINE_COUNT_THRESHOLD: usize = 200;
/// Default line-count / page-count thresholds for the density guard.
pub const DENSITY_MAX_PAGE_COUNT: u32 = 2;
/// Confidence multiplier applied when the density guard trips.
pub const DENSITY_PENALTY: f64 = 0.7;
/// `confidence.overall` cap applied when any guard triggers.
pub const GUARD_TRIPPED_OVERALL_CAP: f64 = 0.55;

/// Collapse whitespace runs to a single space and lowercase, for
/// case-insensitive substring anchoring.
fn normalize_for_anchor(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// `true` if any 8+ character whitespace-delimited token in `text`
/// appears in `haystack`.
fn has_long_token_match(text: &str, haystack: &str) -> bool {
    text.split_whitespace().any(|tok| tok.chars().count() >= 8 && haystack.contains(&tok.to_lowercase()))
}

/// Outcome of the anchor guard for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorResult {
    /// `true` if at least one anchor matched the source text.
    pub anchored: bool,
}

/// Anchor guard (§4.6): at least one of {raw SKU, an 8+ char description
/// token, quantity as a string} must appear in the source text.
#[must_use]
pub fn check_anchor(line: &ExtractedLine, source_text: &str) -> AnchorResult {
    let haystack = normalize_for_anchor(source_text);

    let sku_matches = line
        .customer_sku_raw
        .as_deref()
        .map(|sku| haystack.contains(&normalize_for_anchor(sku)))
        .unwrap_or(false);

    let description_matches = line
        .product_description
        .as_deref()
        .map(|desc| has_long_token_match(desc, &haystack))
        .unwrap_or(false);

    let qty_matches = line
        .qty
        .map(|qty| haystack.contains(&qty.normalize().to_string()) || haystack.contains(&qty.to_string()))
        .unwrap_or(false);

    AnchorResult { anchored: sku_matches || description_matches || qty_matches }
}

/// Range guard (§4.6): `true` if `qty` is within `(0, max_qty]`.
#[must_use]
pub fn check_range(qty: Money, max_qty: Money) -> bool {
    qty > Money::ZERO && qty <= max_qty
}

/// Density guard (§4.6): `true` (tripped) if the line count is
/// suspiciously high for how few pages the document has.
#[must_use]
pub fn check_density_tripped(line_count: usize, page_count: u32) -> bool {
    line_count > DENSITY_LINE_COUNT_THRESHOLD && page_count <= DENSITY_MAX_PAGE_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: Option<&str>, desc: Option<&str>, qty: Option<Money>) -> ExtractedLine {
        ExtractedLine {
            line_no: 1,
            customer_sku_raw: sku.map(str::to_string),
            product_description: desc.map(str::to_string),
            qty,
            uom: None,
            unit_price: None,
            currency: None,
            requested_delivery_date: None,
        }
    }

    #[test]
    fn sku_anchor_matches_case_insensitively() {
        let l = line(Some("AB-12"), None, None);
        let result = check_anchor(&l, "Artikel ab-12 wird geliefert");
        assert!(result.anchored);
    }

    #[test]
    fn description_long_token_anchor_matches() {
        let l = line(None, Some("Sechskantschrauben 4x20"), None);
        let result = check_anchor(&l, "Bestellung: Sechskantschrauben 4x20, Menge 10");
        assert!(result.anchored);
    }

    #[test]
    fn short_description_tokens_do_not_anchor() {
        let l = line(None, Some("10 mm"), None);
        let result = check_anchor(&l, "Bestellung 10 mm Schraube");
        assert!(!result.anchored);
    }

    #[test]
    fn qty_as_string_anchors() {
        let l = line(None, None, Some(Money::from(42)));
        let result = check_anchor(&l, "Menge: 42 Stueck");
        assert!(result.anchored);
    }

    #[test]
    fn nothing_matching_does_not_anchor() {
        let l = line(Some("ZZ-99"), Some("Unrelatedxxxxxxx"), Some(Money::from(7)));
        let result = check_anchor(&l, "this document mentions none of that");
        assert!(!result.anchored);
    }

    #[test]
    fn range_guard_rejects_zero_and_negative_and_oversize() {
        assert!(!check_range(Money::ZERO, DEFAULT_MAX_QTY));
        assert!(!check_range(Money::from(-1), DEFAULT_MAX_QTY));
        assert!(!check_range(Money::from(1_000_001), DEFAULT_MAX_QTY));
        assert!(check_range(Money::from(1), DEFAULT_MAX_QTY));
        assert!(check_range(DEFAULT_MAX_QTY, DEFAULT_MAX_QTY));
    }

    #[test]
    fn density_guard_trips_on_many_lines_few_pages() {
        assert!(check_density_tripped(201, 2));
        assert!(!check_density_tripped(200, 2));
        assert!(!check_density_tripped(500, 3));
    }
}
