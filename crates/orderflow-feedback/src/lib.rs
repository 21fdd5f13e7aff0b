// SPDX-License-Identifier: MIT OR Apache-2.0
//! Feedback Recorder (C13): pure `FeedbackEvent` constructors plus the
//! `SkuMapping` upsert side effect a mapping correction performs (§4.13).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Feedback event constructors.
pub mod events;
/// SkuMapping learning.
pub mod mapping;

pub use events::{
    record_customer_selection, record_field_edit, record_issue_override, record_mapping_confirmation,
    FeedbackEvent, FeedbackEventKind,
};
pub use mapping::{confirm_mapping, reject_mapping, SkuMapping, SkuMappingStatus};
