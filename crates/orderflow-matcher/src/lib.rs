// SPDX-License-Identifier: MIT OR Apache-2.0
//! Matcher (C9): ranks catalog product candidates against a draft line
//! using a confirmed-mapping / trigram / vector hybrid score, then
//! decides whether to auto-apply the top candidate (§4.9).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Canonical embedding texts and cosine similarity.
pub mod embedding;
/// UoM and price penalty tables.
pub mod penalty;
/// Per-candidate scoring, ranking, and the auto-apply gate.
pub mod scoring;

pub use embedding::{cosine_similarity, line_query_text, product_embedding_text, s_emb};
pub use penalty::{price_penalty, uom_penalty, PriceComparison, UomCompatibility};
pub use scoring::{
    rank_and_decide, s_map, s_tri, MappingStatus, MatchCandidate, MatchDecision,
    DEFAULT_AUTO_APPLY_GAP, DEFAULT_AUTO_APPLY_THRESHOLD, LOW_CONFIDENCE_MATCH_THRESHOLD,
};

use orderflow_core::ProductId;

/// One candidate product surfaced by a single source (confirmed/suggested
/// mapping lookup, trigram search, or vector search), before the three
/// sources are merged into a [`MatchCandidate`] per product.
#[derive(Debug, Clone)]
pub struct SourcedCandidate {
    /// The candidate product.
    pub product_id: ProductId,
    /// Internal SKU.
    pub internal_sku: String,
    /// Set when a `SkuMapping` row names this product for the line's
    /// normalized customer SKU.
    pub mapping_status: Option<MappingStatus>,
    /// Set when trigram search surfaced this product; raw `S_tri`.
    pub trigram_score: Option<f64>,
    /// Set when vector search surfaced this product; raw `S_emb`.
    pub embedding_score: Option<f64>,
    /// UoM compatibility against the line.
    pub uom_compatibility: UomCompatibility,
    /// Price comparison against the line.
    pub price_comparison: PriceComparison,
}

/// Merge candidates surfaced by independent sources that name the same
/// product into a single [`MatchCandidate`], taking the best score each
/// source offered for that product (a product can be found by more than
/// one source; we never double count, we just keep the strongest signal
/// per axis).
#[must_use]
pub fn merge_sourced_candidates(sourced: Vec<SourcedCandidate>) -> Vec<MatchCandidate> {
    use std::collections::HashMap;

    let mut by_product: HashMap<ProductId, MatchCandidate> = HashMap::new();
    for c in sourced {
        let entry = by_product.entry(c.product_id).or_insert_with(|| MatchCandidate {
            product_id: c.product_id,
            internal_sku: c.internal_sku.clone(),
            s_map: 0.0,
            s_tri: 0.0,
            s_emb: 0.0,
            uom_compatibility: c.uom_compatibility,
            price_comparison: c.price_comparison,
        });
        if let Some(status) = c.mapping_status {
            entry.s_map = entry.s_map.max(s_map(Some(status)));
        }
        if let Some(tri) = c.trigram_score {
            entry.s_tri = entry.s_tri.max(tri);
        }
        if let Some(emb) = c.embedding_score {
            entry.s_emb = entry.s_emb.max(emb);
        }
    }
    by_product.into_values().collect()
}

/// Full matcher pipeline: merge sourced candidates, rank, and apply the
/// auto-apply gate with the default threshold/gap.
#[must_use]
pub fn match_line(sourced: Vec<SourcedCandidate>) -> (Vec<MatchCandidate>, MatchDecision) {
    let candidates = merge_sourced_candidates(sourced);
    rank_and_decide(candidates, DEFAULT_AUTO_APPLY_THRESHOLD, DEFAULT_AUTO_APPLY_GAP)
}

/// `true` if the decision's confidence falls below the low-confidence
/// warning threshold (§4.9, feeds `LOW_CONFIDENCE_MATCH`).
#[must_use]
pub fn is_low_confidence(decision: &MatchDecision) -> bool {
    match decision {
        MatchDecision::AutoApplied { confidence, .. } | MatchDecision::Suggested { confidence, .. } => {
            *confidence < LOW_CONFIDENCE_MATCH_THRESHOLD
        }
        MatchDecision::NoCandidates => true,
    }
}
