// SPDX-License-Identifier: MIT OR Apache-2.0
//! Header synonym table shared by the CSV and XLSX extractors (§4.5).

use std::collections::HashMap;

/// A logical column any tabular extractor can fill from a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Customer SKU / article number.
    Sku,
    /// Product description.
    Description,
    /// Quantity ordered.
    Qty,
    /// Unit of measure.
    Uom,
    /// Unit price.
    UnitPrice,
    /// Currency code.
    Currency,
    /// External order number.
    OrderNumber,
    /// Order date.
    OrderDate,
    /// Requested delivery date.
    DeliveryDate,
}

/// Closed-domain header synonyms (German and English), used as the
/// fallback when a tenant has no per-tenant synonym table configured.
#[must_use]
pub fn default_header_synonyms() -> HashMap<&'static str, Column> {
    use Column::*;
    HashMap::from([
        ("artikelnummer", Sku),
        ("artikel-nr", Sku),
        ("artikelnr", Sku),
        ("art.-nr.", Sku),
        ("sku", Sku),
        ("item number", Sku),
        ("item no", Sku),
        ("product code", Sku),
        ("bezeichnung", Description),
        ("beschreibung", Description),
        ("artikelbezeichnung", Description),
        ("description", Description),
        ("product description", Description),
        ("item description", Description),
        ("menge", Qty),
        ("anzahl", Qty),
        ("qty", Qty),
        ("quantity", Qty),
        ("einheit", Uom),
        ("me", Uom),
        ("uom", Uom),
        ("unit", Uom),
        ("unit of measure", Uom),
        ("preis", UnitPrice),
        ("einzelpreis", UnitPrice),
        ("stückpreis", UnitPrice),
        ("price", UnitPrice),
        ("unit price", UnitPrice),
        ("währung", Currency),
        ("waehrung", Currency),
        ("currency", Currency),
        ("bestellnummer", OrderNumber),
        ("auftragsnummer", OrderNumber),
        ("order number", OrderNumber),
        ("order no", OrderNumber),
        ("po number", OrderNumber),
        ("bestelldatum", OrderDate),
        ("order date", OrderDate),
        ("lieferdatum", DeliveryDate),
        ("delivery date", DeliveryDate),
        ("requested delivery date", DeliveryDate),
    ])
}

/// Normalize a raw header cell for synonym lookup: trim, lowercase,
/// collapse internal whitespace.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map a row of raw header cells to column indices, using `synonyms` with
/// the closed-domain table as fallback for anything it doesn't cover.
#[must_use]
pub fn map_headers(
    raw_headers: &[String],
    synonyms: &HashMap<&str, Column>,
) -> HashMap<Column, usize> {
    let fallback = default_header_synonyms();
    let mut result = HashMap::new();
    for (idx, raw) in raw_headers.iter().enumerate() {
        let key = normalize_header(raw);
        let column = synonyms
            .get(key.as_str())
            .or_else(|| fallback.get(key.as_str()))
            .copied();
        if let Some(column) = column {
            result.entry(column).or_insert(idx);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_german_headers() {
        let headers = vec![
            "Artikelnummer".to_string(),
            "Menge".to_string(),
            "Einheit".to_string(),
            "Preis".to_string(),
        ];
        let map = map_headers(&headers, &HashMap::new());
        assert_eq!(map[&Column::Sku], 0);
        assert_eq!(map[&Column::Qty], 1);
        assert_eq!(map[&Column::Uom], 2);
        assert_eq!(map[&Column::UnitPrice], 3);
    }

    #[test]
    fn unknown_header_is_simply_absent() {
        let headers = vec!["Some Random Column".to_string()];
        let map = map_headers(&headers, &HashMap::new());
        assert!(map.is_empty());
    }

    #[test]
    fn per_tenant_synonym_overrides_closed_domain_table() {
        let headers = vec!["Kurzbezeichnung".to_string()];
        let mut synonyms = HashMap::new();
        synonyms.insert("kurzbezeichnung", Column::Description);
        let map = map_headers(&headers, &synonyms);
        assert_eq!(map[&Column::Description], 0);
    }
}
