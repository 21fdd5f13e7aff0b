// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dedup Store (C2).
//!
//! Two keys (§4.2, §6.5):
//!
//! 1. **Inbound dedup**: `(tenant, source, provider_message_id)` — a
//!    collision returns 250-OK-equivalent success without re-processing.
//! 2. **Document dedup**: `(tenant, sha256, filename, size)` — a collision
//!    reuses the existing `Document` row.
//!
//! Dedup is advisory for idempotence; the raw bytes of a duplicate MAY
//! still be re-stored (overwriting identical content is a no-op).
#![deny(unsafe_code)]
#![warn(missing_docs)]

use orderflow_core::{InboundSource, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lowercase dedup key for an inbound message, per §6.5.
///
/// `message_ref` is either the provider-supplied message id or the
/// synthetic `urn:sha256:<hash>` id assigned when one is absent (§4.3).
#[must_use]
pub fn inbound_dedup_key(tenant: TenantId, source: InboundSource, message_ref: &str) -> String {
    let source_tag = match source {
        InboundSource::Email => "email",
        InboundSource::Upload => "upload",
    };
    format!(
        "{}:{}:{}",
        tenant,
        source_tag,
        message_ref.trim().to_lowercase()
    )
}

/// Lowercase-hex dedup key for a document, per §6.5.
///
/// `sha256` must already be a lowercase hex digest (see
/// [`orderflow_core::sha256_hex`]).
#[must_use]
pub fn document_dedup_key(tenant: TenantId, sha256: &str, filename: &str, size: u64) -> String {
    format!(
        "{}:{}:{}:{}",
        tenant,
        sha256.to_lowercase(),
        filename.trim().to_lowercase(),
        size
    )
}

/// Result of a dedup check-and-reserve operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DedupOutcome {
    /// The key had not been seen before and is now reserved.
    New,
    /// The key was already reserved; the caller should treat this as a
    /// no-op success rather than re-processing.
    Duplicate,
}

/// An in-process reservation set for dedup keys.
///
/// A real deployment backs this with a unique index in the relational
/// store (§1 scope); this type gives the same check-and-reserve semantics
/// in memory, for tests and the [`orderflow_mock`](../orderflow_mock)
/// adapter.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: HashSet<String>,
}

impl DedupSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically check whether `key` has been seen, and if not, reserve it.
    pub fn check_and_reserve(&mut self, key: String) -> DedupOutcome {
        if self.seen.insert(key) {
            DedupOutcome::New
        } else {
            DedupOutcome::Duplicate
        }
    }

    /// Number of keys currently reserved.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// `true` if no keys have been reserved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
