// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical export record (§6.2) and its dropzone filename.

use chrono::{DateTime, Utc};
use orderflow_core::{DocumentId, DraftOrderId, Money};
use serde::{Deserialize, Serialize};

/// `export_version` stamped into every export record.
pub const EXPORT_VERSION: &str = "orderflow_export_json_v1";

/// Customer identity as exported to the ERP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportCustomer {
    /// Internal customer id.
    pub id: String,
    /// ERP-facing customer number, if known.
    pub erp_customer_number: Option<String>,
    /// Customer display name.
    pub name: String,
}

/// Header fields carried through to the export record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportHeader {
    /// Customer's own order number, if stated.
    pub external_order_number: Option<String>,
    /// Order date, if stated.
    pub order_date: Option<chrono::NaiveDate>,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Requested delivery date, if stated.
    pub requested_delivery_date: Option<chrono::NaiveDate>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// One exported order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportLine {
    /// 1-based line number, dense within the draft.
    pub line_no: u32,
    /// Resolved internal SKU.
    pub internal_sku: String,
    /// Quantity.
    pub qty: Money,
    /// Unit of measure.
    pub uom: String,
    /// Unit price.
    pub unit_price: Money,
    /// ISO-4217 currency code for the price.
    pub currency: String,
    /// Raw customer SKU, for ERP cross-reference.
    pub customer_sku_raw: String,
    /// Product description.
    pub description: String,
}

/// Provenance of the source document the draft was created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocumentMeta {
    /// Source document id.
    pub document_id: DocumentId,
    /// Original filename.
    pub file_name: String,
    /// Lowercase-hex SHA-256 of the document's bytes.
    pub sha256: String,
}

/// Export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMeta {
    /// User id or system actor that approved the draft.
    pub created_by: String,
    /// The document the draft was extracted from.
    pub source_document: SourceDocumentMeta,
}

/// The canonical export record written to the dropzone (§6.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Format version, always [`EXPORT_VERSION`].
    pub export_version: String,
    /// Tenant slug, for ERP routing/auditing.
    pub tenant_slug: String,
    /// Draft this export was produced from.
    pub draft_id: DraftOrderId,
    /// When the draft was approved.
    pub approved_at: DateTime<Utc>,
    /// Customer identity.
    pub customer: ExportCustomer,
    /// Header fields.
    pub header: ExportHeader,
    /// Order lines.
    pub lines: Vec<ExportLine>,
    /// Metadata.
    pub meta: ExportMeta,
}

impl ExportRecord {
    /// Serialize to canonical (pretty, stable key order via `serde_json`
    /// struct field order) JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

/// The dropzone filename for an export: `sales_order_<draft_id>_<YYYYMMDDTHHMMSSZ>.json`.
#[must_use]
pub fn export_filename(draft_id: DraftOrderId, approved_at: DateTime<Utc>) -> String {
    format!("sales_order_{draft_id}_{}.json", approved_at.format("%Y%m%dT%H%M%SZ"))
}
