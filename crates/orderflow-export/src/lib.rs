// SPDX-License-Identifier: MIT OR Apache-2.0
//! Approve & Push (C12): the canonical export record, atomic dropzone
//! write, and push idempotence (§4.12, §6.2).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Idempotent push orchestration.
pub mod push;
/// The canonical export record.
pub mod record;

pub use push::{push_export, PushOutcome};
pub use record::{
    export_filename, ExportCustomer, ExportHeader, ExportLine, ExportMeta, ExportRecord,
    SourceDocumentMeta, EXPORT_VERSION,
};
