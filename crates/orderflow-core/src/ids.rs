// SPDX-License-Identifier: MIT OR Apache-2.0
//! Strongly-typed entity identifiers.
//!
//! Every entity in the data model (§3) carries a unique id and a tenant id.
//! Using one newtype per entity kind (rather than passing bare [`Uuid`]s
//! around) makes it a compile error to, say, pass a `DocumentId` where a
//! `DraftOrderId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a `Uuid`-backed newtype identifier with the common trait set
/// every entity id needs (construction, display, serde, ordering).
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing [`Uuid`].
            #[must_use]
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// The underlying [`Uuid`].
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identifies a tenant (wholesale distributor) in the system.
    TenantId
);
define_id!(
    /// Identifies an [`InboundMessage`](crate) arrival event.
    InboundMessageId
);
define_id!(
    /// Identifies a `Document` (one parsed attachment or upload).
    DocumentId
);
define_id!(
    /// Identifies an `ExtractionRun` attempt.
    ExtractionRunId
);
define_id!(
    /// Identifies a `DraftOrder`, the central aggregate root.
    DraftOrderId
);
define_id!(
    /// Identifies a `DraftOrderLine` within its parent draft.
    DraftOrderLineId
);
define_id!(
    /// Identifies a `Product` catalog item.
    ProductId
);
define_id!(
    /// Identifies a `Customer`.
    CustomerId
);
define_id!(
    /// Identifies a `CustomerContact` child of a `Customer`.
    CustomerContactId
);
define_id!(
    /// Identifies a `SkuMapping` learned association.
    SkuMappingId
);
define_id!(
    /// Identifies a `ValidationIssue`.
    ValidationIssueId
);
define_id!(
    /// Identifies a `CustomerDetectionCandidate`.
    CustomerDetectionCandidateId
);
define_id!(
    /// Identifies an `AICallLog` row.
    AiCallLogId
);
define_id!(
    /// Identifies a `FeedbackEvent`.
    FeedbackEventId
);
define_id!(
    /// Identifies an `AuditLog` row.
    AuditLogId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types_with_shared_behavior() {
        let a = DraftOrderId::new();
        let b = DraftOrderId::new();
        assert_ne!(a, b);
        assert_eq!(a, DraftOrderId::from_uuid(a.as_uuid()));
    }

    #[test]
    fn display_matches_uuid() {
        let id = TenantId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn serde_roundtrip_is_transparent() {
        let id = DocumentId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
