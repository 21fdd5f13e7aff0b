// SPDX-License-Identifier: MIT OR Apache-2.0
//! Draft Engine (C11): the status state machine, the ready-check gate,
//! confidence aggregation, and optimistic-concurrency retry for draft
//! updates (§4.11).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Confidence aggregation formulas.
pub mod confidence;
/// Optimistic concurrency retry.
pub mod concurrency;
/// The ready-check gate.
pub mod ready_check;
/// The status state machine.
pub mod state_machine;

pub use confidence::{
    customer_confidence, extraction_confidence, extraction_penalty, header_score, line_score,
    line_weighted_average, matching_confidence, overall_confidence, CustomerResolution,
    ExtractionPenaltyInputs, HeaderFieldConfidences, LineFieldConfidences,
};
pub use concurrency::{retry_on_conflict, VersionConflict, Versioned, MAX_RETRIES};
pub use ready_check::{check_ready, ReadyCheckHeader, ReadyCheckLine, ReadyCheckResult};
pub use state_machine::{is_allowed_transition, is_terminal, transition, DraftStatus, StateMachineViolation};

/// Given a freshly computed ready-check result and the draft's current
/// status, decide the status it should auto-flip to. Only flips between
/// `NEEDS_REVIEW` and `READY`; every other status is left untouched
/// (§4.11: "never out of APPROVED/PUSHING/PUSHED/REJECTED").
#[must_use]
pub fn apply_ready_check_result(current: DraftStatus, result: &ReadyCheckResult) -> DraftStatus {
    match current {
        DraftStatus::Extracted | DraftStatus::NeedsReview | DraftStatus::Ready => {
            if result.is_ready {
                DraftStatus::Ready
            } else {
                DraftStatus::NeedsReview
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ready_result(is_ready: bool) -> ReadyCheckResult {
        ReadyCheckResult { is_ready, blocking_reasons: vec![], checked_at: Utc::now() }
    }

    #[test]
    fn extracted_flips_to_ready_when_check_passes() {
        assert_eq!(apply_ready_check_result(DraftStatus::Extracted, &ready_result(true)), DraftStatus::Ready);
    }

    #[test]
    fn needs_review_flips_back_to_ready() {
        assert_eq!(apply_ready_check_result(DraftStatus::NeedsReview, &ready_result(true)), DraftStatus::Ready);
    }

    #[test]
    fn ready_flips_back_to_needs_review_when_check_fails() {
        assert_eq!(apply_ready_check_result(DraftStatus::Ready, &ready_result(false)), DraftStatus::NeedsReview);
    }

    #[test]
    fn approved_and_beyond_never_flip() {
        for status in [DraftStatus::Approved, DraftStatus::Pushing, DraftStatus::Pushed, DraftStatus::Rejected] {
            assert_eq!(apply_ready_check_result(status, &ready_result(false)), status);
            assert_eq!(apply_ready_check_result(status, &ready_result(true)), status);
        }
    }
}
