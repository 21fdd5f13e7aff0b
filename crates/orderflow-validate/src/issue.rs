// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed issue vocabulary and issue lifecycle (§4.10).

use orderflow_core::{DraftOrderId, DraftOrderLineId, ValidationIssueId};
use serde::{Deserialize, Serialize};

/// The closed set of validation issue types, one variant per row of the
/// vocabulary table. Adding a new kind of finding means adding a variant
/// here — callers cannot invent their own issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    /// Header: no customer resolved for the draft.
    MissingCustomer,
    /// Header: no currency resolved for the draft.
    MissingCurrency,
    /// Header: customer detection did not clear the auto-select gate.
    CustomerAmbiguous,
    /// Line: no customer SKU present.
    MissingSku,
    /// Line: SKU did not resolve to a catalog product.
    UnknownProduct,
    /// Line: no quantity present.
    MissingQty,
    /// Line: quantity present but not a valid positive amount.
    InvalidQty,
    /// Line: no unit of measure present.
    MissingUom,
    /// Line: unit of measure present but not in the canonical set.
    UnknownUom,
    /// Line: unit of measure known but incompatible with the matched
    /// product's UoM.
    UomIncompatible,
    /// Line: no unit price present.
    MissingPrice,
    /// Line: stated unit price differs from the catalog price beyond
    /// tolerance.
    PriceMismatch,
    /// Line: duplicate of another line in the same draft.
    DuplicateLine,
    /// Header or line: extraction confidence fell below the acceptance
    /// threshold.
    LowConfidenceExtraction,
    /// Line: match confidence fell below the acceptance threshold.
    LowConfidenceMatch,
    /// Header or line: LLM output failed parsing/repair/guards.
    LlmOutputInvalid,
}

impl IssueType {
    /// The default severity for this issue type (§4.10). `PriceMismatch`
    /// and `LlmOutputInvalid` carry a policy-selectable severity in the
    /// spec ("W or E per policy" / "W/E"); this is the default used when
    /// no tenant policy override applies.
    #[must_use]
    pub fn default_severity(self) -> Severity {
        use IssueType::{
            CustomerAmbiguous, DuplicateLine, InvalidQty, LlmOutputInvalid, LowConfidenceExtraction,
            LowConfidenceMatch, MissingCurrency, MissingCustomer, MissingPrice, MissingQty, MissingSku,
            MissingUom, PriceMismatch, UnknownProduct, UnknownUom, UomIncompatible,
        };
        match self {
            MissingCustomer
            | MissingCurrency
            | CustomerAmbiguous
            | MissingSku
            | UnknownProduct
            | MissingQty
            | InvalidQty
            | MissingUom
            | UnknownUom
            | UomIncompatible => Severity::Error,
            MissingPrice
            | DuplicateLine
            | LowConfidenceExtraction
            | LowConfidenceMatch => Severity::Warning,
            PriceMismatch | LlmOutputInvalid => Severity::Warning,
        }
    }
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Should be reviewed but does not block progression.
    Warning,
    /// Blocks the draft from reaching `READY` (§4.11 ready-check rule 4).
    Error,
}

/// Lifecycle status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueStatus {
    /// Raised and not yet addressed.
    Open,
    /// An operator has seen it and chosen not to act.
    Acknowledged,
    /// The underlying condition no longer holds.
    Resolved,
    /// An operator has explicitly overridden it.
    Overridden,
}

/// What an issue is attached to: the draft header, or one of its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTarget {
    /// Attached to the draft as a whole.
    Header(DraftOrderId),
    /// Attached to a specific line.
    Line(DraftOrderLineId),
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable identity, preserved across re-runs that recognize the same
    /// `(issue_type, target)`.
    pub id: ValidationIssueId,
    /// What this issue is attached to.
    pub target: IssueTarget,
    /// Which vocabulary entry this is.
    pub issue_type: IssueType,
    /// Current severity (may be overridden from the default by tenant
    /// policy, e.g. for `PriceMismatch`).
    pub severity: Severity,
    /// Current lifecycle status.
    pub status: IssueStatus,
    /// Human-readable message.
    pub message: String,
}

impl ValidationIssue {
    /// Construct a freshly raised, `OPEN` issue with the type's default
    /// severity.
    #[must_use]
    pub fn raise(target: IssueTarget, issue_type: IssueType, message: impl Into<String>) -> Self {
        Self {
            id: ValidationIssueId::new(),
            target,
            issue_type,
            severity: issue_type.default_severity(),
            status: IssueStatus::Open,
            message: message.into(),
        }
    }

    /// The `(issue_type, target)` key that defines this issue's identity
    /// across validator re-runs (§4.10).
    #[must_use]
    pub fn identity(&self) -> (IssueType, IssueTarget) {
        (self.issue_type, self.target)
    }
}
