// SPDX-License-Identifier: MIT OR Apache-2.0
//! Upload acceptance contract (§4.3).

use serde::{Deserialize, Serialize};

pub use crate::smtp::DEFAULT_MAX_MESSAGE_BYTES;

/// Media types accepted for direct upload, per §4.3.
const ALLOWED_UPLOAD_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Disposition of a direct upload acceptance attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadDisposition {
    /// Accepted and enqueued for extraction.
    Accepted,
    /// Identical to a previously accepted upload; no re-processing.
    Duplicate,
    /// Media type is not in the allowed set.
    UnsupportedMediaType,
    /// Upload exceeds the configured size cap.
    Oversize,
}

/// Decide the disposition of a direct upload, given its declared media
/// type and size.
#[must_use]
pub fn accept_upload(
    media_type: &str,
    size_bytes: u64,
    max_bytes: u64,
    is_duplicate: impl FnOnce() -> bool,
) -> UploadDisposition {
    if !ALLOWED_UPLOAD_MEDIA_TYPES.contains(&media_type) {
        return UploadDisposition::UnsupportedMediaType;
    }
    if size_bytes > max_bytes {
        return UploadDisposition::Oversize;
    }
    if is_duplicate() {
        return UploadDisposition::Duplicate;
    }
    UploadDisposition::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_media_types() {
        for mt in ALLOWED_UPLOAD_MEDIA_TYPES {
            assert_eq!(
                accept_upload(mt, 10, DEFAULT_MAX_MESSAGE_BYTES, || false),
                UploadDisposition::Accepted
            );
        }
    }

    #[test]
    fn rejects_unsupported_media_type() {
        assert_eq!(
            accept_upload("application/zip", 10, DEFAULT_MAX_MESSAGE_BYTES, || false),
            UploadDisposition::UnsupportedMediaType
        );
    }

    #[test]
    fn rejects_oversize_upload() {
        assert_eq!(
            accept_upload(
                "application/pdf",
                DEFAULT_MAX_MESSAGE_BYTES + 1,
                DEFAULT_MAX_MESSAGE_BYTES,
                || false
            ),
            UploadDisposition::Oversize
        );
    }

    #[test]
    fn duplicate_upload_is_a_no_op() {
        assert_eq!(
            accept_upload("text/csv", 10, DEFAULT_MAX_MESSAGE_BYTES, || true),
            UploadDisposition::Duplicate
        );
    }
}
