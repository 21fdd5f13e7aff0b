// SPDX-License-Identifier: MIT OR Apache-2.0
//! Score aggregation and the auto-select decision gate (§4.8).

use orderflow_core::{clamp01, CustomerId};

use crate::signals::SignalScore;

/// Upper bound an aggregate score is clamped to, per §4.8.
const AGGREGATE_CAP: f64 = 0.999;

/// Combine multiple signal scores for the same candidate customer via
/// noisy-OR: `score = 1 - Π(1 - score_i)`, clamped to [`AGGREGATE_CAP`].
#[must_use]
pub fn aggregate_signals(scores: &[SignalScore]) -> f64 {
    let complement_product: f64 = scores.iter().map(|s| 1.0 - s.score).product();
    (1.0 - complement_product).min(AGGREGATE_CAP).max(0.0)
}

/// One scored candidate customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerCandidate {
    /// The candidate customer.
    pub customer_id: CustomerId,
    /// Its aggregate score across all contributing signals.
    pub aggregate_score: f64,
    /// The individual signals that contributed, for the debug record.
    pub signals: Vec<SignalScore>,
}

/// Default auto-select threshold for top1's aggregate score (§4.8).
pub const DEFAULT_AUTO_SELECT_THRESHOLD: f64 = 0.90;
/// Default required gap between top1 and top2 for auto-select (§4.8).
pub const DEFAULT_AUTO_SELECT_GAP: f64 = 0.07;

/// The detector's decision for one draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionDecision {
    /// Top candidate cleared both the threshold and the gap; auto-select
    /// it with the given confidence.
    AutoSelected {
        /// The selected customer.
        customer_id: CustomerId,
        /// `customer_confidence` to store on the draft.
        confidence: f64,
    },
    /// No candidate cleared the gate; a `CUSTOMER_AMBIGUOUS` issue is
    /// raised and the draft's customer id stays null.
    Ambiguous,
    /// No candidates were scored at all.
    NoCandidates,
}

/// Sort candidates by aggregate score descending, retain the top 5, and
/// apply the auto-select gate (§4.8).
#[must_use]
pub fn decide(
    mut candidates: Vec<CustomerCandidate>,
    threshold: f64,
    gap: f64,
) -> (Vec<CustomerCandidate>, DetectionDecision) {
    candidates.sort_by(|a, b| {
        b.aggregate_score
            .partial_cmp(&a.aggregate_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(5);

    let decision = match candidates.first() {
        None => DetectionDecision::NoCandidates,
        Some(top1) => {
            let top2_score = candidates.get(1).map(|c| c.aggregate_score).unwrap_or(0.0);
            if top1.aggregate_score >= threshold && top1.aggregate_score - top2_score >= gap {
                DetectionDecision::AutoSelected {
                    customer_id: top1.customer_id,
                    confidence: top1.aggregate_score,
                }
            } else {
                DetectionDecision::Ambiguous
            }
        }
    };

    (candidates, decision)
}

/// `customer_confidence` recorded when an operator manually selects a
/// customer: `max(candidate_score, 0.90)`, reflecting human verification.
#[must_use]
pub fn manual_selection_confidence(candidate_score: Option<f64>) -> f64 {
    clamp01(candidate_score.unwrap_or(0.0).max(0.90))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalId;

    fn score(signal: SignalId, score: f64) -> SignalScore {
        SignalScore { signal, score }
    }

    #[test]
    fn noisy_or_combines_independent_signals() {
        // 1 - (1-0.75)(1-0.40) = 1 - 0.25*0.60 = 1 - 0.15 = 0.85
        let agg = aggregate_signals(&[score(SignalId::S2, 0.75), score(SignalId::S5, 0.40)]);
        assert!((agg - 0.85).abs() < 1e-9);
    }

    #[test]
    fn aggregate_is_capped_below_one() {
        let agg = aggregate_signals(&[score(SignalId::S1, 0.95), score(SignalId::S4, 0.98)]);
        assert!(agg <= AGGREGATE_CAP);
    }

    #[test]
    fn customer_ambiguity_scenario_from_spec() {
        // Two customers share a domain; both score S2=0.75 with no other signal.
        let c1 = CustomerCandidate {
            customer_id: CustomerId::new(),
            aggregate_score: 0.75,
            signals: vec![score(SignalId::S2, 0.75)],
        };
        let c2 = CustomerCandidate {
            customer_id: CustomerId::new(),
            aggregate_score: 0.75,
            signals: vec![score(SignalId::S2, 0.75)],
        };
        let (ranked, decision) = decide(
            vec![c1, c2],
            DEFAULT_AUTO_SELECT_THRESHOLD,
            DEFAULT_AUTO_SELECT_GAP,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(decision, DetectionDecision::Ambiguous);
    }

    #[test]
    fn auto_selects_when_threshold_and_gap_both_clear() {
        let c1 = CustomerCandidate {
            customer_id: CustomerId::new(),
            aggregate_score: 0.95,
            signals: vec![score(SignalId::S1, 0.95)],
        };
        let c2 = CustomerCandidate {
            customer_id: CustomerId::new(),
            aggregate_score: 0.80,
            signals: vec![score(SignalId::S2, 0.75)],
        };
        let (_, decision) = decide(
            vec![c1.clone(), c2],
            DEFAULT_AUTO_SELECT_THRESHOLD,
            DEFAULT_AUTO_SELECT_GAP,
        );
        assert_eq!(
            decision,
            DetectionDecision::AutoSelected {
                customer_id: c1.customer_id,
                confidence: 0.95,
            }
        );
    }

    #[test]
    fn boundary_just_under_threshold_is_ambiguous() {
        let c1 = CustomerCandidate {
            customer_id: CustomerId::new(),
            aggregate_score: 0.8999,
            signals: vec![],
        };
        let (_, decision) = decide(vec![c1], DEFAULT_AUTO_SELECT_THRESHOLD, DEFAULT_AUTO_SELECT_GAP);
        assert_eq!(decision, DetectionDecision::Ambiguous);
    }

    #[test]
    fn boundary_gap_just_under_required_is_ambiguous() {
        let c1 = CustomerCandidate {
            customer_id: CustomerId::new(),
            aggregate_score: 0.95,
            signals: vec![],
        };
        let c2 = CustomerCandidate {
            customer_id: CustomerId::new(),
            aggregate_score: 0.95 - 0.0699,
            signals: vec![],
        };
        let (_, decision) = decide(vec![c1, c2], DEFAULT_AUTO_SELECT_THRESHOLD, DEFAULT_AUTO_SELECT_GAP);
        assert_eq!(decision, DetectionDecision::Ambiguous);
    }

    #[test]
    fn manual_selection_confidence_floors_at_point_nine() {
        assert_eq!(manual_selection_confidence(Some(0.50)), 0.90);
        assert_eq!(manual_selection_confidence(Some(0.95)), 0.95);
        assert_eq!(manual_selection_confidence(None), 0.90);
    }

    #[test]
    fn top_five_retained_at_most() {
        let candidates: Vec<_> = (0..8)
            .map(|i| CustomerCandidate {
                customer_id: CustomerId::new(),
                aggregate_score: i as f64 / 10.0,
                signals: vec![],
            })
            .collect();
        let (ranked, _) = decide(candidates, DEFAULT_AUTO_SELECT_THRESHOLD, DEFAULT_AUTO_SELECT_GAP);
        assert_eq!(ranked.len(), 5);
    }
}
