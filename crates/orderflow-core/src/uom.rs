// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical unit-of-measure set and synonym normalization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The canonical unit-of-measure set (GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalUom {
    /// Piece / Stück.
    St,
    /// Meter.
    M,
    /// Centimeter.
    Cm,
    /// Millimeter.
    Mm,
    /// Kilogram.
    Kg,
    /// Gram.
    G,
    /// Liter.
    L,
    /// Milliliter.
    Ml,
    /// Carton / Karton.
    Kar,
    /// Pallet.
    Pal,
    /// Set.
    Set,
}

impl CanonicalUom {
    /// All canonical values, in declaration order.
    pub const ALL: &'static [CanonicalUom] = &[
        Self::St,
        Self::M,
        Self::Cm,
        Self::Mm,
        Self::Kg,
        Self::G,
        Self::L,
        Self::Ml,
        Self::Kar,
        Self::Pal,
        Self::Set,
    ];

    /// Stable uppercase code, e.g. `"ST"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::St => "ST",
            Self::M => "M",
            Self::Cm => "CM",
            Self::Mm => "MM",
            Self::Kg => "KG",
            Self::G => "G",
            Self::L => "L",
            Self::Ml => "ML",
            Self::Kar => "KAR",
            Self::Pal => "PAL",
            Self::Set => "SET",
        }
    }
}

impl fmt::Display for CanonicalUom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default synonym table consulted before a tenant's own overrides.
///
/// Case-insensitive; matched after trimming whitespace. This is the
/// "closed-domain fallback" referenced in §4.5; the synonyms themselves are
/// tenant configuration per the Open Questions resolution in §9.
pub fn default_uom_synonyms() -> HashMap<&'static str, CanonicalUom> {
    use CanonicalUom::*;
    [
        ("st", St),
        ("stk", St),
        ("stück", St),
        ("stueck", St),
        ("stk.", St),
        ("pc", St),
        ("pcs", St),
        ("piece", St),
        ("pieces", St),
        ("ea", St),
        ("each", St),
        ("m", M),
        ("meter", M),
        ("meters", M),
        ("metre", M),
        ("mtr", M),
        ("cm", Cm),
        ("centimeter", Cm),
        ("mm", Mm),
        ("millimeter", Mm),
        ("kg", Kg),
        ("kilogram", Kg),
        ("kilo", Kg),
        ("g", G),
        ("gram", G),
        ("gramm", G),
        ("l", L),
        ("liter", L),
        ("litre", L),
        ("ltr", L),
        ("ml", Ml),
        ("milliliter", Ml),
        ("kar", Kar),
        ("karton", Kar),
        ("carton", Kar),
        ("ctn", Kar),
        ("box", Kar),
        ("pal", Pal),
        ("pallet", Pal),
        ("palette", Pal),
        ("set", Set),
        ("sets", Set),
    ]
    .into_iter()
    .collect()
}

/// Normalize a raw unit-of-measure token against the given synonym table
/// (tenant overrides should already be merged into `synonyms` by the
/// caller, taking precedence over [`default_uom_synonyms`]).
///
/// Returns `None` when the token is empty or not recognized — callers
/// attach `UNKNOWN_UOM`/`MISSING_UOM` per §4.5 in that case.
pub fn normalize_uom(raw: &str, synonyms: &HashMap<&str, CanonicalUom>) -> Option<CanonicalUom> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    synonyms.get(key.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_default_synonyms() {
        let table = default_uom_synonyms();
        assert_eq!(normalize_uom("Stk", &table), Some(CanonicalUom::St));
        assert_eq!(normalize_uom("Meter", &table), Some(CanonicalUom::M));
        assert_eq!(normalize_uom(" KG ", &table), Some(CanonicalUom::Kg));
    }

    #[test]
    fn unknown_token_is_none() {
        let table = default_uom_synonyms();
        assert_eq!(normalize_uom("furlong", &table), None);
        assert_eq!(normalize_uom("", &table), None);
    }

    #[test]
    fn display_round_trips_through_as_str() {
        for uom in CanonicalUom::ALL {
            assert_eq!(uom.to_string(), uom.as_str());
        }
    }

    #[test]
    fn serde_uses_uppercase_code() {
        let json = serde_json::to_string(&CanonicalUom::Kar).unwrap();
        assert_eq!(json, "\"KAR\"");
    }
}
