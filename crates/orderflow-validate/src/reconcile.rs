// SPDX-License-Identifier: MIT OR Apache-2.0
//! Idempotent re-run diffing against a caller-supplied snapshot of prior
//! issues (§4.10).

use std::collections::HashMap;

use crate::issue::{IssueStatus, IssueTarget, IssueType, ValidationIssue};

/// Reconcile this run's findings against the prior issue set for the same
/// draft, preserving operator-set statuses and issue identity.
///
/// Rules (§4.10):
/// - Issue identity is `(issue_type, target)`; a re-run never creates a
///   second issue with the same identity.
/// - A finding that recurs and was previously `ACKNOWLEDGED` or
///   `OVERRIDDEN` stays in that status (operator decisions are preserved).
/// - A finding that recurs and was previously `OPEN`, `RESOLVED`, or
///   unseen is (re)opened.
/// - A prior `OPEN` issue whose condition no longer holds is `RESOLVED`.
/// - A prior `ACKNOWLEDGED`/`OVERRIDDEN`/`RESOLVED` issue whose condition
///   no longer holds is left untouched.
#[must_use]
pub fn reconcile(
    findings: Vec<(IssueType, IssueTarget, String)>,
    prior: Vec<ValidationIssue>,
) -> Vec<ValidationIssue> {
    let mut prior_by_identity: HashMap<(IssueType, IssueTarget), ValidationIssue> =
        prior.into_iter().map(|issue| (issue.identity(), issue)).collect();

    let mut recurring = std::collections::HashSet::new();
    let mut result = Vec::with_capacity(findings.len());

    for (issue_type, target, message) in findings {
        let identity = (issue_type, target);
        recurring.insert(identity);
        match prior_by_identity.remove(&identity) {
            Some(existing) if matches!(existing.status, IssueStatus::Acknowledged | IssueStatus::Overridden) => {
                result.push(existing);
            }
            Some(mut existing) => {
                existing.status = IssueStatus::Open;
                existing.message = message;
                result.push(existing);
            }
            None => result.push(ValidationIssue::raise(target, issue_type, message)),
        }
    }

    for (_, mut leftover) in prior_by_identity {
        if leftover.status == IssueStatus::Open {
            leftover.status = IssueStatus::Resolved;
        }
        result.push(leftover);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::DraftOrderId;

    fn target() -> IssueTarget {
        IssueTarget::Header(DraftOrderId::new())
    }

    #[test]
    fn unchanged_findings_are_idempotent() {
        let t = target();
        let first = reconcile(vec![(IssueType::MissingCurrency, t, "m".to_string())], vec![]);
        let second = reconcile(vec![(IssueType::MissingCurrency, t, "m".to_string())], first.clone());
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].status, IssueStatus::Open);
    }

    #[test]
    fn condition_no_longer_holding_resolves_open_issue() {
        let t = target();
        let prior = reconcile(vec![(IssueType::MissingCurrency, t, "m".to_string())], vec![]);
        let next = reconcile(vec![], prior);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].status, IssueStatus::Resolved);
    }

    #[test]
    fn acknowledged_issue_is_preserved_across_recurrence() {
        let t = target();
        let mut prior = reconcile(vec![(IssueType::MissingCurrency, t, "m".to_string())], vec![]);
        prior[0].status = IssueStatus::Acknowledged;
        let next = reconcile(vec![(IssueType::MissingCurrency, t, "m".to_string())], prior);
        assert_eq!(next[0].status, IssueStatus::Acknowledged);
    }

    #[test]
    fn overridden_issue_is_preserved_even_when_condition_clears() {
        let t = target();
        let mut prior = reconcile(vec![(IssueType::MissingCurrency, t, "m".to_string())], vec![]);
        prior[0].status = IssueStatus::Overridden;
        let next = reconcile(vec![], prior);
        assert_eq!(next[0].status, IssueStatus::Overridden);
    }

    #[test]
    fn resolved_issue_recreated_only_if_condition_recurs() {
        let t = target();
        let prior = reconcile(vec![(IssueType::MissingCurrency, t, "m".to_string())], vec![]);
        let gone = reconcile(vec![], prior);
        assert_eq!(gone[0].status, IssueStatus::Resolved);
        let recurred = reconcile(vec![(IssueType::MissingCurrency, t, "m again".to_string())], gone);
        assert_eq!(recurred.len(), 1);
        assert_eq!(recurred[0].status, IssueStatus::Open);
    }
}
