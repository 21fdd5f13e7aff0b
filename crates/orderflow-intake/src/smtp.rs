// SPDX-License-Identifier: MIT OR Apache-2.0
//! SMTP acceptance contract (§4.3, §6.3).

use orderflow_core::TenantId;
use serde::{Deserialize, Serialize};

/// Default oversize cutoff: 25 MiB.
pub const DEFAULT_MAX_MESSAGE_BYTES: u64 = 25 * 1024 * 1024;

/// Disposition of one SMTP `DATA` acceptance attempt, mapped to the SMTP
/// reply codes in §6.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmtpDisposition {
    /// Accepted and enqueued for extraction. Reply: 250.
    Accepted,
    /// Duplicate of a previously accepted message; no re-processing. Reply: 250.
    Duplicate,
    /// Recipient local-part slug does not match a known tenant. Reply: 550.
    UnknownTenant,
    /// Message exceeds the configured size cap. Reply: 552.
    Oversize,
    /// Storage/DB unavailable; sender should retry. Reply: 451.
    Transient,
}

impl SmtpDisposition {
    /// The SMTP reply code for this disposition (§6.3).
    #[must_use]
    pub fn reply_code(&self) -> u16 {
        match self {
            Self::Accepted | Self::Duplicate => 250,
            Self::Transient => 451,
            Self::UnknownTenant => 550,
            Self::Oversize => 552,
        }
    }
}

/// Parse the tenant slug out of a `orders+<slug>@<domain>` recipient
/// local-part (§4.3, §6.3). Returns `None` if the local-part doesn't match
/// the `orders+<slug>` form.
#[must_use]
pub fn parse_recipient_slug(local_part: &str) -> Option<&str> {
    let slug = local_part.strip_prefix("orders+")?;
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Resolve a recipient's tenant slug to a tenant, given the intake
/// dependencies. Storage failures are modeled as `Err` so the caller can
/// map them to [`SmtpDisposition::Transient`]; everything else collapses
/// into a disposition directly since SMTP acceptance has no other
/// escalation path.
pub fn accept_inbound(
    local_part: &str,
    message_size_bytes: u64,
    max_message_bytes: u64,
    resolve_tenant: impl FnOnce(&str) -> Option<TenantId>,
    is_duplicate: impl FnOnce() -> bool,
) -> SmtpDisposition {
    let Some(slug) = parse_recipient_slug(local_part) else {
        return SmtpDisposition::UnknownTenant;
    };
    if resolve_tenant(slug).is_none() {
        return SmtpDisposition::UnknownTenant;
    }
    if message_size_bytes > max_message_bytes {
        return SmtpDisposition::Oversize;
    }
    if is_duplicate() {
        return SmtpDisposition::Duplicate;
    }
    SmtpDisposition::Accepted
}
