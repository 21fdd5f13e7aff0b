// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unified error taxonomy with stable error codes for OrderFlow.
//!
//! Every error surfaced by the core carries an [`ErrorCode`] (a
//! machine-readable, stable string tag, §7), a human-readable message, an
//! optional cause chain, and arbitrary key-value context. Use the builder
//! returned by [`OrderFlowError::new`] to construct errors fluently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Intake acceptance errors (MIME, media type, tenant resolution).
    Intake,
    /// Object/relational storage unavailability.
    Storage,
    /// LLM / embedding provider errors.
    Provider,
    /// Extraction parsing and guard errors.
    Extraction,
    /// Draft state machine errors.
    StateMachine,
    /// Optimistic concurrency conflicts.
    Concurrency,
    /// AI cost budget enforcement.
    Budget,
    /// Dropzone delivery errors.
    Dropzone,
    /// Configuration errors.
    Config,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Intake => "intake",
            Self::Storage => "storage",
            Self::Provider => "provider",
            Self::Extraction => "extraction",
            Self::StateMachine => "state_machine",
            Self::Concurrency => "concurrency",
            Self::Budget => "budget",
            Self::Dropzone => "dropzone",
            Self::Config => "config",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code, one variant per error kind named in
/// §7, plus the two structural kinds (`NotFound`, `Internal`) every
/// tenant-scoped read/write path needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invalid media type, oversize payload, or malformed MIME.
    InputRejected,
    /// Intake addressed to an unknown tenant slug.
    TenantUnknown,
    /// A row is absent or not visible to the caller's tenant.
    ///
    /// Cross-tenant access always surfaces as this code, never as a
    /// forbidden/denied variant — see the Tenant Guard contract.
    NotFound,
    /// Object store or relational store unavailable; caller should retry.
    TransientStorage,
    /// LLM/embedding provider did not respond within the configured deadline.
    ProviderTimeout,
    /// LLM/embedding provider reported rate limiting.
    ProviderRateLimit,
    /// Extractor output was unparseable or schema-invalid after one repair
    /// attempt.
    LlmOutputInvalid,
    /// A hallucination guard triggered; output accepted with capped
    /// confidence.
    LlmSuspicious,
    /// Draft transition requested is not in the allowed state table.
    StateMachineViolation,
    /// Optimistic version mismatch on update, exhausted retries.
    OptimisticConflict,
    /// Daily tenant AI cost budget exhausted.
    BudgetExceeded,
    /// Dropzone write failed (filesystem, SFTP, or SMB).
    DropzoneWriteError,
    /// Configuration file or value is invalid.
    ConfigInvalid,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputRejected | Self::TenantUnknown => ErrorCategory::Intake,
            Self::NotFound => ErrorCategory::Internal,
            Self::TransientStorage => ErrorCategory::Storage,
            Self::ProviderTimeout | Self::ProviderRateLimit => ErrorCategory::Provider,
            Self::LlmOutputInvalid | Self::LlmSuspicious => ErrorCategory::Extraction,
            Self::StateMachineViolation => ErrorCategory::StateMachine,
            Self::OptimisticConflict => ErrorCategory::Concurrency,
            Self::BudgetExceeded => ErrorCategory::Budget,
            Self::DropzoneWriteError => ErrorCategory::Dropzone,
            Self::ConfigInvalid => ErrorCategory::Config,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation (e.g. `"INPUT_REJECTED"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputRejected => "INPUT_REJECTED",
            Self::TenantUnknown => "TENANT_UNKNOWN",
            Self::NotFound => "NOT_FOUND",
            Self::TransientStorage => "TRANSIENT_STORAGE",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",
            Self::ProviderRateLimit => "PROVIDER_RATE_LIMIT",
            Self::LlmOutputInvalid => "LLM_OUTPUT_INVALID",
            Self::LlmSuspicious => "LLM_SUSPICIOUS",
            Self::StateMachineViolation => "STATE_MACHINE_VIOLATION",
            Self::OptimisticConflict => "OPTIMISTIC_CONFLICT",
            Self::BudgetExceeded => "BUDGET_EXCEEDED",
            Self::DropzoneWriteError => "DROPZONE_WRITE_ERROR",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::Internal => "INTERNAL",
        }
    }

    /// `true` for errors the caller should retry (possibly after backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientStorage | Self::ProviderTimeout | Self::ProviderRateLimit
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderFlowError
// ---------------------------------------------------------------------------

/// Unified OrderFlow error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use orderflow_error::{OrderFlowError, ErrorCode};
///
/// let err = OrderFlowError::new(ErrorCode::ProviderTimeout, "llm call timed out")
///     .with_context("provider", "text_llm")
///     .with_context("deadline_ms", 40_000);
/// ```
pub struct OrderFlowError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl OrderFlowError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Shorthand for `self.code.is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Construct a [`ErrorCode::NotFound`] error.
    ///
    /// Used on every cross-tenant read miss so a caller outside the tenant
    /// cannot distinguish "doesn't exist" from "exists in another tenant".
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found", entity.into())).with_context(
            "id",
            id.to_string(),
        )
    }
}

impl fmt::Debug for OrderFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("OrderFlowError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for OrderFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty() {
            // Deterministic output thanks to BTreeMap.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for OrderFlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, OrderFlowError>;

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of an [`OrderFlowError`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderFlowErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&OrderFlowError> for OrderFlowErrorDto {
    fn from(err: &OrderFlowError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<OrderFlowErrorDto> for OrderFlowError {
    fn from(dto: OrderFlowErrorDto) -> Self {
        Self {
            code: dto.code,
            message: dto.message,
            source: None,
            context: dto.context,
        }
    }
}
