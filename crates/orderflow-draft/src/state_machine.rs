// SPDX-License-Identifier: MIT OR Apache-2.0
//! The draft status state machine: a closed transition table, never an
//! open match with a wildcard success arm (§4.11).

use serde::{Deserialize, Serialize};

/// A draft's lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    /// Just created from an inbound document, nothing extracted yet.
    New,
    /// Extraction completed (rule and/or LLM).
    Extracted,
    /// Needs operator attention before it can be approved.
    NeedsReview,
    /// Ready-check passed; eligible for approval.
    Ready,
    /// An operator approved the draft.
    Approved,
    /// Export to the dropzone is in flight.
    Pushing,
    /// Export succeeded.
    Pushed,
    /// Export failed; needs review or a push retry.
    Error,
    /// An operator rejected the draft. Terminal.
    Rejected,
}

/// Requested transition is not in the allowed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot transition draft from {from:?} to {to:?}")]
pub struct StateMachineViolation {
    /// The status the draft was in.
    pub from: DraftStatus,
    /// The status that was requested.
    pub to: DraftStatus,
}

/// `true` if `to` is a state `from` may transition into directly (§4.11).
#[must_use]
pub fn is_allowed_transition(from: DraftStatus, to: DraftStatus) -> bool {
    use DraftStatus::{Approved, Error, Extracted, NeedsReview, New, Pushed, Pushing, Ready, Rejected};
    matches!(
        (from, to),
        (New, Extracted)
            | (Extracted, NeedsReview)
            | (Extracted, Ready)
            | (NeedsReview, Ready)
            | (NeedsReview, Rejected)
            | (Ready, Approved)
            | (Ready, NeedsReview)
            | (Approved, Pushing)
            | (Pushing, Pushed)
            | (Pushing, Error)
            | (Error, NeedsReview)
            | (Error, Pushing)
    )
}

/// Attempt a transition, returning [`StateMachineViolation`] if it isn't in
/// the allowed table.
pub fn transition(from: DraftStatus, to: DraftStatus) -> Result<DraftStatus, StateMachineViolation> {
    if is_allowed_transition(from, to) {
        Ok(to)
    } else {
        Err(StateMachineViolation { from, to })
    }
}

/// `true` if the status never transitions out (`REJECTED`, `PUSHED`).
#[must_use]
pub fn is_terminal(status: DraftStatus) -> bool {
    matches!(status, DraftStatus::Rejected | DraftStatus::Pushed)
}
