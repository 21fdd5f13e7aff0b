// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared domain types for OrderFlow.
//!
//! This crate has no knowledge of any one component's business logic; it
//! only carries the vocabulary every component needs: strongly-typed entity
//! ids, the canonical unit-of-measure set, SKU normalization, timestamps,
//! and the money type.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The canonical extraction record shared by every extractor.
pub mod extraction_record;
/// Strongly-typed entity identifiers.
pub mod ids;
/// SKU normalization.
pub mod sku;
/// Hand-rolled trigram similarity.
pub mod trigram;
/// Canonical unit-of-measure set and synonym tables.
pub mod uom;

pub use extraction_record::{
    CustomerHint, ExtractedLine, ExtractionConfidence, ExtractionRecord, ExtractionWarning,
    HeaderConfidence, LineConfidence, OrderHeader, ShipTo,
};
pub use ids::*;
pub use sku::normalize_customer_sku;
pub use trigram::trigram_similarity;
pub use uom::{default_uom_synonyms, normalize_uom, CanonicalUom};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Moment in time used for every entity's `created_at`/`updated_at`.
pub type Timestamp = DateTime<Utc>;

/// Monetary and quantity amounts. Always exact decimal, never `f64` — see
/// SPEC_FULL.md §3 "Representation".
pub type Money = rust_decimal::Decimal;

/// Clamp a confidence/score value into the closed unit interval `[0, 1]`.
///
/// Every confidence field in the data model carries this invariant (§8).
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Lowercase hex-encoded SHA-256 digest of `bytes`.
///
/// Used for document content hashes (§4.2) and AI call input-hashes (§4.7).
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Source that produced an [`ids::InboundMessageId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundSource {
    /// Received over SMTP.
    Email,
    /// Received via the HTTP upload endpoint.
    Upload,
}

/// ISO 4217 currency code, stored as an uppercase 3-letter string.
///
/// Kept as a thin wrapper rather than a closed enum: the catalog of valid
/// codes changes independently of this crate and validation happens at the
/// boundary (extractor / validator), not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    /// Construct from a raw string, upper-casing it.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    /// `true` if the code is exactly 3 ASCII uppercase letters.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 3 && self.0.bytes().all(|b| b.is_ascii_uppercase())
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
