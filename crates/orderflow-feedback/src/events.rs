// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pure `FeedbackEvent` constructors (§4.13). Every operator correction
//! emits one of these; callers persist the result and, for mapping
//! corrections, also apply [`crate::mapping::confirm_mapping`].

use chrono::{DateTime, Utc};
use orderflow_core::{CustomerId, DraftOrderId, DraftOrderLineId, FeedbackEventId, TenantId};
use serde::{Deserialize, Serialize};

/// What kind of correction an operator made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackEventKind {
    /// An operator confirmed or rejected a suggested SKU mapping.
    MappingConfirmation {
        /// The line the mapping applies to.
        line_id: DraftOrderLineId,
        /// Normalized customer SKU the mapping is keyed on.
        normalized_customer_sku: String,
        /// Internal SKU confirmed (or rejected) for that customer SKU.
        internal_sku: String,
        /// `true` if confirmed, `false` if rejected.
        confirmed: bool,
    },
    /// An operator edited an extracted field.
    FieldEdit {
        /// The line the edit applies to, or `None` for a header field.
        line_id: Option<DraftOrderLineId>,
        /// Name of the field edited.
        field: String,
        /// Value before the edit, serialized.
        before: serde_json::Value,
        /// Value after the edit, serialized.
        after: serde_json::Value,
    },
    /// An operator manually selected the draft's customer.
    CustomerSelection {
        /// The customer selected.
        customer_id: CustomerId,
        /// The detector's candidate score for this customer, if offered.
        candidate_score: Option<f64>,
    },
    /// An operator overrode a validation issue's status.
    IssueOverride {
        /// The issue overridden, by its id.
        issue_id: orderflow_core::ValidationIssueId,
        /// Status before the override.
        before_status: String,
        /// Status after the override.
        after_status: String,
    },
}

/// An append-only feedback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    /// Unique id.
    pub id: FeedbackEventId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Draft this correction was made on.
    pub draft_id: DraftOrderId,
    /// What was corrected.
    pub kind: FeedbackEventKind,
    /// Layout fingerprint of the source document, when one is available —
    /// used downstream to select few-shot examples for the same
    /// `(tenant, layout_fingerprint)`.
    pub layout_fingerprint: Option<String>,
    /// When the correction was recorded.
    pub recorded_at: DateTime<Utc>,
}

fn new_event(
    tenant_id: TenantId,
    draft_id: DraftOrderId,
    kind: FeedbackEventKind,
    layout_fingerprint: Option<String>,
    recorded_at: DateTime<Utc>,
) -> FeedbackEvent {
    FeedbackEvent {
        id: FeedbackEventId::new(),
        tenant_id,
        draft_id,
        kind,
        layout_fingerprint,
        recorded_at,
    }
}

/// Record a mapping confirmation or rejection.
#[must_use]
pub fn record_mapping_confirmation(
    tenant_id: TenantId,
    draft_id: DraftOrderId,
    line_id: DraftOrderLineId,
    normalized_customer_sku: impl Into<String>,
    internal_sku: impl Into<String>,
    confirmed: bool,
    layout_fingerprint: Option<String>,
    recorded_at: DateTime<Utc>,
) -> FeedbackEvent {
    new_event(
        tenant_id,
        draft_id,
        FeedbackEventKind::MappingConfirmation {
            line_id,
            normalized_customer_sku: normalized_customer_sku.into(),
            internal_sku: internal_sku.into(),
            confirmed,
        },
        layout_fingerprint,
        recorded_at,
    )
}

/// Record a field edit.
#[must_use]
pub fn record_field_edit(
    tenant_id: TenantId,
    draft_id: DraftOrderId,
    line_id: Option<DraftOrderLineId>,
    field: impl Into<String>,
    before: serde_json::Value,
    after: serde_json::Value,
    layout_fingerprint: Option<String>,
    recorded_at: DateTime<Utc>,
) -> FeedbackEvent {
    new_event(
        tenant_id,
        draft_id,
        FeedbackEventKind::FieldEdit { line_id, field: field.into(), before, after },
        layout_fingerprint,
        recorded_at,
    )
}

/// Record a manual customer selection.
#[must_use]
pub fn record_customer_selection(
    tenant_id: TenantId,
    draft_id: DraftOrderId,
    customer_id: CustomerId,
    candidate_score: Option<f64>,
    layout_fingerprint: Option<String>,
    recorded_at: DateTime<Utc>,
) -> FeedbackEvent {
    new_event(
        tenant_id,
        draft_id,
        FeedbackEventKind::CustomerSelection { customer_id, candidate_score },
        layout_fingerprint,
        recorded_at,
    )
}

/// Record an issue status override.
#[must_use]
pub fn record_issue_override(
    tenant_id: TenantId,
    draft_id: DraftOrderId,
    issue_id: orderflow_core::ValidationIssueId,
    before_status: impl Into<String>,
    after_status: impl Into<String>,
    layout_fingerprint: Option<String>,
    recorded_at: DateTime<Utc>,
) -> FeedbackEvent {
    new_event(
        tenant_id,
        draft_id,
        FeedbackEventKind::IssueOverride {
            issue_id,
            before_status: before_status.into(),
            after_status: after_status.into(),
        },
        layout_fingerprint,
        recorded_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn mapping_confirmation_carries_expected_fields() {
        let event = record_mapping_confirmation(
            TenantId::new(),
            DraftOrderId::new(),
            DraftOrderLineId::new(),
            "AB12",
            "INT-999",
            true,
            Some("fp-1".to_string()),
            now(),
        );
        match event.kind {
            FeedbackEventKind::MappingConfirmation { confirmed, internal_sku, .. } => {
                assert!(confirmed);
                assert_eq!(internal_sku, "INT-999");
            }
            _ => panic!("wrong kind"),
        }
        assert_eq!(event.layout_fingerprint.as_deref(), Some("fp-1"));
    }

    #[test]
    fn event_round_trips_through_json() {
        let event = record_customer_selection(
            TenantId::new(),
            DraftOrderId::new(),
            CustomerId::new(),
            Some(0.75),
            None,
            now(),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: FeedbackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, event.id);
    }
}
