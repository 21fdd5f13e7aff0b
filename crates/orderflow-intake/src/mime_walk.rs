// SPDX-License-Identifier: MIT OR Apache-2.0
//! MIME part walking and attachment extraction (§4.3).

use orderflow_core::sha256_hex;

/// How a MIME part declared itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentDisposition {
    /// `Content-Disposition: inline`.
    Inline,
    /// `Content-Disposition: attachment` (or any non-inline leaf part).
    Attachment,
}

/// One leaf part of a parsed MIME message, after any encoded-word filename
/// decoding.
#[derive(Debug, Clone)]
pub struct MimePart {
    /// How the part was declared.
    pub disposition: ContentDisposition,
    /// Decoded filename, if the part declared one.
    pub filename: Option<String>,
    /// MIME media type, e.g. `"application/pdf"`.
    pub media_type: String,
    /// Whether this is an image part (`media_type` starts with `image/`).
    pub is_image: bool,
    /// Raw part bytes.
    pub bytes: Vec<u8>,
}

/// Walk all parts of a parsed message and return the leaf attachments per
/// §4.3: inline image parts are skipped *unless* no other attachment
/// exists, in which case the sole inline image is kept so the message
/// isn't dropped entirely.
#[must_use]
pub fn extract_attachments(parts: Vec<MimePart>) -> Vec<MimePart> {
    let non_inline_images: Vec<MimePart> = parts
        .iter()
        .filter(|p| !(p.disposition == ContentDisposition::Inline && p.is_image))
        .cloned()
        .collect();

    if !non_inline_images.is_empty() {
        return non_inline_images;
    }
    // No non-inline-image attachment survived; fall back to whatever inline
    // image parts exist rather than producing zero attachments.
    parts
        .into_iter()
        .filter(|p| p.disposition == ContentDisposition::Inline && p.is_image)
        .collect()
}

/// File extension guessed from a media type, used for synthetic filenames.
fn ext_from_media_type(media_type: &str) -> &'static str {
    match media_type {
        "application/pdf" => "pdf",
        "text/csv" => "csv",
        "application/vnd.ms-excel" => "xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "text/plain" => "txt",
        _ => "bin",
    }
}

/// Synthetic filename assigned when a part lacks one: `part-<index>.<ext>`.
#[must_use]
pub fn synthetic_filename(index: usize, media_type: &str) -> String {
    format!("part-{index}.{}", ext_from_media_type(media_type))
}

/// Resolve the effective filename for a part: its declared filename, or a
/// synthetic one derived from its position and media type.
#[must_use]
pub fn effective_filename(part: &MimePart, index: usize) -> String {
    part.filename
        .clone()
        .unwrap_or_else(|| synthetic_filename(index, &part.media_type))
}

/// Synthetic Message-ID assigned to a message lacking one, preserving
/// dedup semantics (§4.3): `urn:sha256:<hash-of-headers-and-body>`.
#[must_use]
pub fn synthetic_message_id(headers_and_body: &[u8]) -> String {
    format!("urn:sha256:{}", sha256_hex(headers_and_body))
}
