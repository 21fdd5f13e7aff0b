// SPDX-License-Identifier: MIT OR Apache-2.0
//! Idempotent push orchestration: looks up a reused idempotency key
//! before writing, and delegates the atomic write to
//! [`DropzoneWriterPort`] (§4.12).

use orderflow_core::{DraftOrderId, TenantId};
use orderflow_draft::DraftStatus;
use orderflow_error::{ErrorCode, OrderFlowError, Result};
use orderflow_ports::{DropzoneWriterPort, PushRecordPort};

use crate::record::{export_filename, ExportRecord};

/// Outcome of a push attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new export was written.
    Written {
        /// The dropzone filename it was written to.
        filename: String,
    },
    /// An idempotency key (or an already-PUSHING/PUSHED draft) matched a
    /// prior push; nothing was (re-)written.
    AlreadyPushed {
        /// The dropzone filename of the prior write.
        filename: String,
    },
}

/// Push a draft's export record, honoring idempotency (§4.12):
///
/// - If `idempotency_key` is given and a prior export for
///   `(tenant_id, draft_id, idempotency_key)` exists, return it unwritten.
/// - Otherwise, if the draft is already `PUSHING`/`PUSHED`, return the
///   prior export named by `current_export_filename` unwritten.
/// - Otherwise, construct the filename, write the record atomically via
///   the dropzone writer, and record it for future idempotency lookups.
///
/// `current_export_filename` is the filename the draft was last pushed
/// under, if any; it backs the keyless idempotence path and is required
/// whenever `draft_status` is `PUSHING` or `PUSHED`.
pub async fn push_export(
    push_records: &dyn PushRecordPort,
    dropzone: &dyn DropzoneWriterPort,
    tenant_id: TenantId,
    draft_id: DraftOrderId,
    idempotency_key: Option<&str>,
    draft_status: DraftStatus,
    current_export_filename: Option<&str>,
    record: ExportRecord,
) -> Result<PushOutcome> {
    if let Some(key) = idempotency_key {
        if let Some(prior) = push_records.find_by_idempotency_key(tenant_id, draft_id, key).await? {
            let filename = prior
                .get("_filename")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    OrderFlowError::new(ErrorCode::Internal, "prior export record missing _filename")
                })?;
            return Ok(PushOutcome::AlreadyPushed { filename });
        }
    } else if matches!(draft_status, DraftStatus::Pushing | DraftStatus::Pushed) {
        let filename = current_export_filename.ok_or_else(|| {
            OrderFlowError::new(ErrorCode::Internal, "draft is PUSHING/PUSHED but has no recorded export filename")
        })?;
        return Ok(PushOutcome::AlreadyPushed { filename: filename.to_string() });
    }

    let filename = export_filename(draft_id, record.approved_at);
    let bytes = record
        .to_json_bytes()
        .map_err(|e| OrderFlowError::new(ErrorCode::Internal, "failed to serialize export record").with_source(e))?;

    dropzone
        .write_atomic(&filename, &bytes)
        .await
        .map_err(|e| OrderFlowError::new(ErrorCode::DropzoneWriteError, "dropzone write failed").with_source(e))?;

    let mut stored = serde_json::to_value(&record)
        .map_err(|e| OrderFlowError::new(ErrorCode::Internal, "failed to serialize export record").with_source(e))?;
    if let serde_json::Value::Object(ref mut map) = stored {
        map.insert("_filename".to_string(), serde_json::Value::String(filename.clone()));
    }
    push_records.record(tenant_id, draft_id, idempotency_key, stored).await?;

    Ok(PushOutcome::Written { filename })
}
