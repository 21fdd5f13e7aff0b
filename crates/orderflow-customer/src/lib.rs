// SPDX-License-Identifier: MIT OR Apache-2.0
//! Customer Detector (C8): signal collection, noisy-OR aggregation, and
//! the auto-select-vs-ambiguity decision gate (§4.8).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Score aggregation and decision gate.
pub mod aggregate;
/// The six detection signals.
pub mod signals;

pub use aggregate::{
    aggregate_signals, decide, manual_selection_confidence, CustomerCandidate, DetectionDecision,
    DEFAULT_AUTO_SELECT_GAP, DEFAULT_AUTO_SELECT_THRESHOLD,
};
pub use signals::{
    extract_candidate_company_name, extract_customer_number, is_generic_email_domain,
    s1_exact_email_match, s2_domain_match, s4_customer_number_match, s5_fuzzy_name_match,
    SignalId, SignalScore, GENERIC_EMAIL_DOMAINS, LEGAL_FORM_TOKENS,
};
