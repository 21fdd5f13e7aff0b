// SPDX-License-Identifier: MIT OR Apache-2.0
//! Validator (C10): evaluates the closed issue vocabulary against a draft
//! snapshot and reconciles the result against prior issues so re-runs are
//! deterministic and idempotent (§4.10).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The closed issue vocabulary and issue lifecycle.
pub mod issue;
/// Idempotent re-run diffing.
pub mod reconcile;
/// Pure per-field rule evaluation.
pub mod rules;

pub use issue::{IssueStatus, IssueTarget, IssueType, Severity, ValidationIssue};
pub use reconcile::reconcile;
pub use rules::{evaluate_header, evaluate_line, HeaderSnapshot, LineSnapshot};

/// Evaluate every rule over a draft's header and lines, then reconcile
/// against the prior issue set. This is the single entry point daemons
/// call after extraction, matching, or any event that triggers a
/// validator re-run (§4.11).
#[must_use]
pub fn validate_draft(
    header: &HeaderSnapshot,
    lines: &[LineSnapshot],
    prior: Vec<ValidationIssue>,
) -> Vec<ValidationIssue> {
    let mut findings: Vec<(IssueType, IssueTarget, String)> = evaluate_header(header)
        .into_iter()
        .map(|(t, m)| (t, IssueTarget::Header(header.draft_id), m))
        .collect();

    for line in lines {
        findings.extend(
            evaluate_line(line)
                .into_iter()
                .map(|(t, m)| (t, IssueTarget::Line(line.line_id), m)),
        );
    }

    reconcile(findings, prior)
}

/// `true` if no `OPEN` issue of [`Severity::Error`] remains (§4.11
/// ready-check rule 4).
#[must_use]
pub fn has_no_open_error(issues: &[ValidationIssue]) -> bool {
    !issues
        .iter()
        .any(|issue| issue.status == IssueStatus::Open && issue.severity == Severity::Error)
}
