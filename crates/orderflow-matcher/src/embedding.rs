// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical embedding query/product texts and cosine similarity (§4.9).

/// Canonical text embedded for a draft line's query vector:
/// `"CUSTOMER_SKU: {raw}\nDESC: {desc}\nUOM: {uom}\n"`.
#[must_use]
pub fn line_query_text(customer_sku_raw: &str, description: &str, uom: &str) -> String {
    format!("CUSTOMER_SKU: {customer_sku_raw}\nDESC: {description}\nUOM: {uom}\n")
}

/// Canonical text embedded for a product, over SKU, name, description, and
/// selected attributes plus its UoM map — attributes are passed
/// pre-selected and pre-formatted by the caller since which attributes
/// matter is tenant/catalog configuration.
#[must_use]
pub fn product_embedding_text(
    sku: &str,
    name: &str,
    description: &str,
    attributes: &str,
    uom_map: &str,
) -> String {
    format!("SKU: {sku}\nNAME: {name}\nDESC: {description}\nATTRS: {attributes}\nUOM_MAP: {uom_map}\n")
}

/// Cosine similarity between two equal-dimension vectors, or `0.0` if
/// either is the zero vector (undefined cosine treated as no similarity).
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "embedding dimension mismatch");
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Map a raw cosine similarity `[-1, 1]` to the matcher's `S_emb` score
/// `[0, 1]`: `(cosine + 1) / 2`.
#[must_use]
pub fn s_emb(cosine: f64) -> f64 {
    (cosine + 1.0) / 2.0
}
