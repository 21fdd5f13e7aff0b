// SPDX-License-Identifier: MIT OR Apache-2.0
//! UoM and price penalty factors applied to a candidate's raw score
//! (§4.9).

/// Compatibility of a candidate's UoM against the line's declared UoM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UomCompatibility {
    /// Units match (after conversion) — no penalty.
    Compatible,
    /// Either side's UoM is missing or unrecognized — small penalty.
    MissingOrUnknown,
    /// Units are known but cannot be converted between each other.
    Incompatible,
}

/// UoM penalty factor, per §4.9.
#[must_use]
pub fn uom_penalty(compat: UomCompatibility) -> f64 {
    match compat {
        UomCompatibility::Compatible => 1.0,
        UomCompatibility::MissingOrUnknown => 0.9,
        UomCompatibility::Incompatible => 0.2,
    }
}

/// How a candidate's catalog price compares to the line's stated unit
/// price, when a [`CustomerPrice`](orderflow_core) tier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceComparison {
    /// No applicable price to compare against (no penalty).
    NotApplicable,
    /// Within tolerance.
    WithinTolerance,
    /// Outside tolerance but not severely.
    Mismatch,
    /// More than 2x the tolerance band away.
    SevereMismatch,
}

/// Price penalty factor, per §4.9.
#[must_use]
pub fn price_penalty(comparison: PriceComparison) -> f64 {
    match comparison {
        PriceComparison::NotApplicable | PriceComparison::WithinTolerance => 1.0,
        PriceComparison::Mismatch => 0.85,
        PriceComparison::SevereMismatch => 0.65,
    }
}
