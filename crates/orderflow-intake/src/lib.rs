// SPDX-License-Identifier: MIT OR Apache-2.0
//! Intake Pipeline (C3): MIME walking, filename decoding, and the SMTP and
//! upload acceptance contracts that decide whether an inbound message
//! becomes a stored [`orderflow_core::ids::InboundMessageId`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod mime_walk;
pub mod rfc2047;
pub mod smtp;
pub mod upload;

pub use mime_walk::{extract_attachments, synthetic_filename, synthetic_message_id, ContentDisposition, MimePart};
pub use rfc2047::decode_filename;
pub use smtp::{accept_inbound, parse_recipient_slug, SmtpDisposition, DEFAULT_MAX_MESSAGE_BYTES};
pub use upload::{accept_upload, UploadDisposition};
