// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-candidate scoring, final confidence, and the auto-apply gate
//! (§4.9).

use orderflow_core::{clamp01, trigram_similarity, ProductId};

use crate::penalty::{price_penalty, uom_penalty, PriceComparison, UomCompatibility};

/// Status of a confirmed/suggested SKU mapping, feeding `S_map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingStatus {
    /// An operator has confirmed this mapping.
    Confirmed,
    /// The system suggested this mapping but it isn't confirmed yet.
    Suggested,
}

/// `S_map`: 1.00 for a confirmed mapping, 0.92 for a suggested one, 0 if
/// no mapping source contributed this candidate.
#[must_use]
pub fn s_map(status: Option<MappingStatus>) -> f64 {
    match status {
        Some(MappingStatus::Confirmed) => 1.00,
        Some(MappingStatus::Suggested) => 0.92,
        None => 0.0,
    }
}

/// `S_tri = max(sim_sku, 0.7 * sim_desc)`, computed from raw trigram
/// similarities against the line's normalized customer SKU and
/// description.
#[must_use]
pub fn s_tri(normalized_customer_sku: &str, line_description: &str, product_sku: &str, product_text: &str) -> f64 {
    let sim_sku = trigram_similarity(normalized_customer_sku, product_sku);
    let sim_desc = trigram_similarity(line_description, product_text);
    sim_sku.max(0.7 * sim_desc)
}

/// One scored product candidate for a draft line.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// The candidate product.
    pub product_id: ProductId,
    /// Internal SKU, used for the lexicographic tie-break.
    pub internal_sku: String,
    /// `S_map` contribution.
    pub s_map: f64,
    /// `S_tri` contribution.
    pub s_tri: f64,
    /// `S_emb` contribution.
    pub s_emb: f64,
    /// UoM compatibility for this candidate against the line.
    pub uom_compatibility: UomCompatibility,
    /// Price comparison for this candidate against the line, if a price
    /// tier applies.
    pub price_comparison: PriceComparison,
}

impl MatchCandidate {
    /// Final `match_confidence` (§4.9):
    /// `clamp01(max(0.99 * S_map, 0.62 * S_tri + 0.38 * S_emb) * P_uom * P_price)`.
    #[must_use]
    pub fn match_confidence(&self) -> f64 {
        let raw = (0.99 * self.s_map).max(0.62 * self.s_tri + 0.38 * self.s_emb);
        let penalty = uom_penalty(self.uom_compatibility) * price_penalty(self.price_comparison);
        clamp01(raw * penalty)
    }
}

/// Default auto-apply confidence threshold (§4.9).
pub const DEFAULT_AUTO_APPLY_THRESHOLD: f64 = 0.92;
/// Default required gap between top1 and top2 for auto-apply (§4.9).
pub const DEFAULT_AUTO_APPLY_GAP: f64 = 0.10;
/// Confidence below which a `LOW_CONFIDENCE_MATCH` warning is attached.
pub const LOW_CONFIDENCE_MATCH_THRESHOLD: f64 = 0.75;

/// The matcher's decision for one line, after ranking.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchDecision {
    /// Top candidate cleared the auto-apply gate.
    AutoApplied {
        /// The chosen candidate.
        product_id: ProductId,
        /// Its match confidence.
        confidence: f64,
    },
    /// A top candidate exists but didn't clear the gate; left as
    /// `SUGGESTED`/`UNMATCHED` for operator review.
    Suggested {
        /// The best candidate, offered as a suggestion.
        product_id: ProductId,
        /// Its match confidence.
        confidence: f64,
    },
    /// No candidates at all.
    NoCandidates,
}

/// Rank candidates (ties broken by internal SKU lexicographically), apply
/// the auto-apply gate, and retain the top 5 for the match debug record
/// (§4.9).
#[must_use]
pub fn rank_and_decide(
    mut candidates: Vec<MatchCandidate>,
    threshold: f64,
    gap: f64,
) -> (Vec<MatchCandidate>, MatchDecision) {
    candidates.sort_by(|a, b| {
        b.match_confidence()
            .partial_cmp(&a.match_confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.internal_sku.cmp(&b.internal_sku))
    });
    candidates.truncate(5);

    let decision = match candidates.first() {
        None => MatchDecision::NoCandidates,
        Some(top1) => {
            let top1_conf = top1.match_confidence();
            let top2_conf = candidates.get(1).map(MatchCandidate::match_confidence).unwrap_or(0.0);
            if top1_conf >= threshold && top1_conf - top2_conf >= gap {
                MatchDecision::AutoApplied {
                    product_id: top1.product_id,
                    confidence: top1_conf,
                }
            } else {
                MatchDecision::Suggested {
                    product_id: top1.product_id,
                    confidence: top1_conf,
                }
            }
        }
    };

    (candidates, decision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(sku: &str, s_map: f64, s_tri: f64, s_emb: f64) -> MatchCandidate {
        MatchCandidate {
            product_id: ProductId::new(),
            internal_sku: sku.to_string(),
            s_map,
            s_tri,
            s_emb,
            uom_compatibility: UomCompatibility::Compatible,
            price_comparison: PriceComparison::NotApplicable,
        }
    }

    #[test]
    fn confirmed_mapping_dominates() {
        let c = candidate("INT-1", 1.0, 0.0, 0.0);
        assert!((c.match_confidence() - 0.99).abs() < 1e-9);
    }

    #[test]
    fn confirmed_mapping_learning_scenario_from_spec() {
        // Operator confirmed AB12 -> INT-999. Confidence after penalties >= 0.99.
        let c = candidate("INT-999", 1.0, 0.3, 0.2);
        assert!(c.match_confidence() >= 0.99);
    }

    #[test]
    fn penalties_reduce_confidence() {
        let mut c = candidate("INT-1", 1.0, 0.0, 0.0);
        c.uom_compatibility = UomCompatibility::Incompatible;
        assert!((c.match_confidence() - 0.99 * 0.2).abs() < 1e-9);
    }

    #[test]
    fn auto_apply_requires_both_threshold_and_gap() {
        let top = candidate("INT-1", 1.0, 0.0, 0.0); // 0.99
        let second = candidate("INT-2", 0.0, 0.9, 0.9); // well under 0.89 gap
        let (_, decision) = rank_and_decide(
            vec![top.clone(), second],
            DEFAULT_AUTO_APPLY_THRESHOLD,
            DEFAULT_AUTO_APPLY_GAP,
        );
        assert!(matches!(decision, MatchDecision::AutoApplied { .. }));
    }

    #[test]
    fn boundary_just_under_threshold_does_not_auto_apply() {
        // match_confidence computed to land at 0.9199 by construction.
        let mut top = candidate("INT-1", 0.0, 1.0, 0.0);
        top.s_tri = 0.9199 / 0.62;
        let (_, decision) = rank_and_decide(vec![top], DEFAULT_AUTO_APPLY_THRESHOLD, DEFAULT_AUTO_APPLY_GAP);
        assert!(matches!(decision, MatchDecision::Suggested { .. }));
    }

    #[test]
    fn boundary_gap_just_under_required_does_not_auto_apply() {
        let top = candidate("INT-1", 1.0, 0.0, 0.0); // 0.99
        let mut second = candidate("INT-2", 0.0, 0.0, 0.0);
        // second's confidence needs to be top - 0.0999 = 0.8901
        second.s_map = 0.8901 / 0.99;
        let (_, decision) = rank_and_decide(vec![top, second], DEFAULT_AUTO_APPLY_THRESHOLD, DEFAULT_AUTO_APPLY_GAP);
        assert!(matches!(decision, MatchDecision::Suggested { .. }));
    }

    #[test]
    fn tie_break_is_lexicographic_on_internal_sku() {
        let a = candidate("ZZZ-1", 1.0, 0.0, 0.0);
        let b = candidate("AAA-1", 1.0, 0.0, 0.0);
        let (ranked, _) = rank_and_decide(vec![a, b], DEFAULT_AUTO_APPLY_THRESHOLD, DEFAULT_AUTO_APPLY_GAP);
        assert_eq!(ranked[0].internal_sku, "AAA-1");
    }

    #[test]
    fn top_five_retained_at_most() {
        let candidates: Vec<_> = (0..8).map(|i| candidate(&format!("SKU-{i}"), 0.0, i as f64 / 10.0, 0.0)).collect();
        let (ranked, _) = rank_and_decide(candidates, DEFAULT_AUTO_APPLY_THRESHOLD, DEFAULT_AUTO_APPLY_GAP);
        assert_eq!(ranked.len(), 5);
    }
}
