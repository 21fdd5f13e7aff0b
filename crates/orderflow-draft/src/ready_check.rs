// SPDX-License-Identifier: MIT OR Apache-2.0
//! The ready-check gate between `READY` and non-`READY` (§4.11).

use chrono::{DateTime, Utc};
use orderflow_core::{CustomerId, Money};
use orderflow_validate::{has_no_open_error, ValidationIssue};

/// One line's fields the ready-check inspects.
#[derive(Debug, Clone)]
pub struct ReadyCheckLine {
    /// Quantity, if extracted.
    pub qty: Option<Money>,
    /// Unit of measure, if extracted.
    pub uom: Option<String>,
    /// Internal SKU resolved by the matcher, if any.
    pub internal_sku: Option<String>,
}

/// Header fields the ready-check inspects.
#[derive(Debug, Clone)]
pub struct ReadyCheckHeader {
    /// Resolved customer, if any.
    pub customer_id: Option<CustomerId>,
    /// `true` once a currency has been resolved.
    pub currency_set: bool,
}

/// Result of a ready-check run, stored on the draft (§4.11).
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyCheckResult {
    /// `true` if every gate condition is satisfied.
    pub is_ready: bool,
    /// Human-readable reasons the draft is not ready, empty when ready.
    pub blocking_reasons: Vec<String>,
    /// When this check ran.
    pub checked_at: DateTime<Utc>,
}

/// Evaluate the four ready-check rules against a header/lines snapshot and
/// the current validation issue set.
#[must_use]
pub fn check_ready(
    header: &ReadyCheckHeader,
    lines: &[ReadyCheckLine],
    issues: &[ValidationIssue],
    checked_at: DateTime<Utc>,
) -> ReadyCheckResult {
    let mut blocking_reasons = Vec::new();

    if header.customer_id.is_none() {
        blocking_reasons.push("no customer resolved".to_string());
    }
    if !header.currency_set {
        blocking_reasons.push("no currency resolved".to_string());
    }
    if lines.is_empty() {
        blocking_reasons.push("draft has no lines".to_string());
    }
    for (index, line) in lines.iter().enumerate() {
        let line_no = index + 1;
        match line.qty {
            None => blocking_reasons.push(format!("line {line_no}: quantity missing")),
            Some(qty) if qty <= Money::ZERO => {
                blocking_reasons.push(format!("line {line_no}: quantity not positive"));
            }
            Some(_) => {}
        }
        if line.uom.is_none() {
            blocking_reasons.push(format!("line {line_no}: unit of measure missing"));
        }
        if line.internal_sku.is_none() {
            blocking_reasons.push(format!("line {line_no}: no internal SKU resolved"));
        }
    }
    if !has_no_open_error(issues) {
        blocking_reasons.push("an OPEN issue of severity ERROR exists".to_string());
    }

    ReadyCheckResult {
        is_ready: blocking_reasons.is_empty(),
        blocking_reasons,
        checked_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn ready_header() -> ReadyCheckHeader {
        ReadyCheckHeader { customer_id: Some(CustomerId::new()), currency_set: true }
    }

    fn ready_line() -> ReadyCheckLine {
        ReadyCheckLine {
            qty: Some(Money::from(1)),
            uom: Some("ST".to_string()),
            internal_sku: Some("INT-1".to_string()),
        }
    }

    #[test]
    fn fully_satisfied_draft_is_ready() {
        let result = check_ready(&ready_header(), &[ready_line()], &[], now());
        assert!(result.is_ready);
        assert!(result.blocking_reasons.is_empty());
    }

    #[test]
    fn missing_customer_and_currency_block() {
        let header = ReadyCheckHeader { customer_id: None, currency_set: false };
        let result = check_ready(&header, &[ready_line()], &[], now());
        assert!(!result.is_ready);
        assert_eq!(result.blocking_reasons.len(), 2);
    }

    #[test]
    fn zero_lines_blocks() {
        let result = check_ready(&ready_header(), &[], &[], now());
        assert!(!result.is_ready);
        assert!(result.blocking_reasons.iter().any(|r| r.contains("no lines")));
    }

    #[test]
    fn incomplete_line_blocks_with_per_field_reasons() {
        let line = ReadyCheckLine { qty: None, uom: None, internal_sku: None };
        let result = check_ready(&ready_header(), &[line], &[], now());
        assert_eq!(result.blocking_reasons.len(), 3);
    }

    #[test]
    fn open_error_issue_blocks() {
        let issue = ValidationIssue::raise(
            orderflow_validate::IssueTarget::Header(orderflow_core::DraftOrderId::new()),
            orderflow_validate::IssueType::MissingCurrency,
            "x",
        );
        let result = check_ready(&ready_header(), &[ready_line()], &[issue], now());
        assert!(!result.is_ready);
    }
}
