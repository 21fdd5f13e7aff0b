// SPDX-License-Identifier: MIT OR Apache-2.0
//! SKU normalization (GLOSSARY: "normalized customer SKU").

/// `upper(strip([^A-Z0-9]))` applied to the raw SKU after trimming and
/// collapsing whitespace.
///
/// Idempotent: `normalize_customer_sku(normalize_customer_sku(x)) ==
/// normalize_customer_sku(x)` for all `x` (§8).
pub fn normalize_customer_sku(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(|c| c.to_uppercase())
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}
