// SPDX-License-Identifier: MIT OR Apache-2.0
//! Worker pool, bounded per-tenant extraction queue, and operator HTTP API.
//!
//! This crate hosts the long-running side of OrderFlow: a pool of tokio
//! tasks draining a bounded, per-tenant [`queue::TenantJobQueue`] of
//! extraction jobs, plus a small Axum API for operators to inspect queue
//! depth and worker activity.

#![deny(unsafe_code)]

pub mod api;
pub mod handler;
pub mod queue;
pub mod retry;
pub mod worker;

pub use api::{build_app, AppState};
pub use handler::{DefaultExtractionJobHandler, ExtractionPipelineConfig};
pub use queue::{ExtractionJob, QueueError, TenantJobQueue, TenantQueueStats};
pub use retry::{compute_delay, is_retryable, retry_async, RetryConfig, RetryMetadata, RetryOutcome};
pub use worker::{spawn_worker_pool, ExtractionJobHandler, WorkerPoolConfig, WorkerPoolStats, WorkerSlotStats, WorkerState};
