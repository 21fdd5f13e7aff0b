// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `SkuMapping` learning side effect a mapping confirmation performs
//! (§4.13, §3 `SkuMapping`): upserting a `CONFIRMED` row, keeping the
//! "at most one CONFIRMED or SUGGESTED mapping per (tenant, customer,
//! normalized SKU)" invariant.

use chrono::{DateTime, Utc};
use orderflow_core::{CustomerId, SkuMappingId, TenantId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a learned SKU mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkuMappingStatus {
    /// Suggested by the matcher, not yet confirmed.
    Suggested,
    /// Confirmed by an operator.
    Confirmed,
    /// Rejected by an operator.
    Rejected,
    /// Superseded by a newer mapping for the same key.
    Deprecated,
}

/// A learned `(tenant, customer, normalized_sku) -> internal_sku`
/// association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuMapping {
    /// Unique id.
    pub id: SkuMappingId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Customer this mapping applies to.
    pub customer_id: CustomerId,
    /// Normalized customer SKU.
    pub normalized_customer_sku: String,
    /// Internal SKU it maps to.
    pub internal_sku: String,
    /// Current status.
    pub status: SkuMappingStatus,
    /// Confidence, `1.0` once confirmed by an operator.
    pub confidence: f64,
    /// Number of times this mapping was used/suggested.
    pub support_count: u32,
    /// Number of times this mapping (or a predecessor for the same key)
    /// was rejected.
    pub reject_count: u32,
    /// Last time this mapping was used in a match.
    pub last_used_at: DateTime<Utc>,
}

/// Apply a mapping confirmation against the prior mapping for the same
/// `(tenant, customer, normalized_sku)` key, if any.
///
/// - If the prior mapping named the same internal SKU, it is promoted
///   in-place to `CONFIRMED` (support count incremented).
/// - If the prior mapping named a *different* internal SKU, it is
///   deprecated and a new `CONFIRMED` mapping is returned alongside it —
///   preserving "at most one CONFIRMED or SUGGESTED mapping per key".
/// - If there was no prior mapping, a fresh `CONFIRMED` mapping is
///   created with `support_count = 1`.
#[must_use]
pub fn confirm_mapping(
    prior: Option<SkuMapping>,
    tenant_id: TenantId,
    customer_id: CustomerId,
    normalized_customer_sku: impl Into<String>,
    internal_sku: impl Into<String>,
    confirmed_at: DateTime<Utc>,
) -> (SkuMapping, Option<SkuMapping>) {
    let internal_sku = internal_sku.into();
    match prior {
        Some(mut mapping) if mapping.internal_sku == internal_sku => {
            mapping.status = SkuMappingStatus::Confirmed;
            mapping.confidence = 1.0;
            mapping.support_count += 1;
            mapping.last_used_at = confirmed_at;
            (mapping, None)
        }
        Some(mut superseded) => {
            superseded.status = SkuMappingStatus::Deprecated;
            let fresh = SkuMapping {
                id: SkuMappingId::new(),
                tenant_id,
                customer_id,
                normalized_customer_sku: normalized_customer_sku.into(),
                internal_sku,
                status: SkuMappingStatus::Confirmed,
                confidence: 1.0,
                support_count: 1,
                reject_count: 0,
                last_used_at: confirmed_at,
            };
            (fresh, Some(superseded))
        }
        None => {
            let fresh = SkuMapping {
                id: SkuMappingId::new(),
                tenant_id,
                customer_id,
                normalized_customer_sku: normalized_customer_sku.into(),
                internal_sku,
                status: SkuMappingStatus::Confirmed,
                confidence: 1.0,
                support_count: 1,
                reject_count: 0,
                last_used_at: confirmed_at,
            };
            (fresh, None)
        }
    }
}

/// Apply a mapping rejection: the prior mapping (if any) is marked
/// `REJECTED` with its reject count incremented. No new mapping is
/// created.
#[must_use]
pub fn reject_mapping(prior: Option<SkuMapping>, rejected_at: DateTime<Utc>) -> Option<SkuMapping> {
    prior.map(|mut mapping| {
        mapping.status = SkuMappingStatus::Rejected;
        mapping.reject_count += 1;
        mapping.last_used_at = rejected_at;
        mapping
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn confirming_fresh_mapping_creates_confirmed_row() {
        let (mapping, superseded) =
            confirm_mapping(None, TenantId::new(), CustomerId::new(), "AB12", "INT-999", now());
        assert_eq!(mapping.status, SkuMappingStatus::Confirmed);
        assert_eq!(mapping.confidence, 1.0);
        assert_eq!(mapping.support_count, 1);
        assert!(superseded.is_none());
    }

    #[test]
    fn confirming_same_internal_sku_promotes_in_place() {
        let tenant_id = TenantId::new();
        let customer_id = CustomerId::new();
        let (suggested, _) = confirm_mapping(None, tenant_id, customer_id, "AB12", "INT-999", now());
        let mut suggested = suggested;
        suggested.status = SkuMappingStatus::Suggested;
        suggested.confidence = 0.92;
        let original_id = suggested.id;

        let (confirmed, superseded) =
            confirm_mapping(Some(suggested), tenant_id, customer_id, "AB12", "INT-999", now());
        assert_eq!(confirmed.id, original_id, "same SKU promotes in place, does not mint a new id");
        assert_eq!(confirmed.status, SkuMappingStatus::Confirmed);
        assert_eq!(confirmed.support_count, 2);
        assert!(superseded.is_none());
    }

    #[test]
    fn confirming_a_different_internal_sku_deprecates_the_old_mapping() {
        let tenant_id = TenantId::new();
        let customer_id = CustomerId::new();
        let (old, _) = confirm_mapping(None, tenant_id, customer_id, "AB12", "INT-001", now());

        let (fresh, superseded) =
            confirm_mapping(Some(old.clone()), tenant_id, customer_id, "AB12", "INT-999", now());
        assert_eq!(fresh.internal_sku, "INT-999");
        let superseded = superseded.expect("old mapping should be returned as superseded");
        assert_eq!(superseded.id, old.id);
        assert_eq!(superseded.status, SkuMappingStatus::Deprecated);
    }

    #[test]
    fn rejecting_increments_reject_count() {
        let (mapping, _) =
            confirm_mapping(None, TenantId::new(), CustomerId::new(), "AB12", "INT-999", now());
        let rejected = reject_mapping(Some(mapping), now()).unwrap();
        assert_eq!(rejected.status, SkuMappingStatus::Rejected);
        assert_eq!(rejected.reject_count, 1);
    }

    #[test]
    fn rejecting_with_no_prior_mapping_is_a_no_op() {
        assert!(reject_mapping(None, now()).is_none());
    }
}
