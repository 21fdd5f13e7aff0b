// SPDX-License-Identifier: MIT OR Apache-2.0
//! Worker pool draining [`TenantJobQueue`], tracking each slot's
//! idle/busy state and current tenant for observability.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use orderflow_core::TenantId;
use orderflow_error::OrderFlowError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::queue::{ExtractionJob, TenantJobQueue};
use crate::retry::{retry_async, RetryConfig};

/// State of one worker slot, for the operator API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Waiting for a job.
    Idle,
    /// Actively processing a job for the given tenant.
    Busy,
}

/// Snapshot of one worker slot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WorkerSlotStats {
    /// Index of the worker within the pool.
    pub slot: usize,
    /// Current state of the slot.
    pub state: WorkerState,
    /// Tenant currently being served, if busy.
    pub tenant_id: Option<TenantId>,
}

struct SlotEntry {
    state: WorkerState,
    tenant_id: Option<TenantId>,
}

/// Tracks live worker slot state for the operator API, separate from the
/// tokio task handles themselves.
#[derive(Default)]
pub struct WorkerPoolStats {
    slots: Mutex<BTreeMap<usize, SlotEntry>>,
}

impl WorkerPoolStats {
    fn set_idle(&self, slot: usize) {
        self.slots.lock().expect("slot lock poisoned").insert(slot, SlotEntry { state: WorkerState::Idle, tenant_id: None });
    }

    fn set_busy(&self, slot: usize, tenant_id: TenantId) {
        self.slots.lock().expect("slot lock poisoned").insert(slot, SlotEntry { state: WorkerState::Busy, tenant_id: Some(tenant_id) });
    }

    /// Snapshot all slots, for the operator API.
    #[must_use]
    pub fn snapshot(&self) -> Vec<WorkerSlotStats> {
        self.slots
            .lock()
            .expect("slot lock poisoned")
            .iter()
            .map(|(slot, entry)| WorkerSlotStats { slot: *slot, state: entry.state, tenant_id: entry.tenant_id })
            .collect()
    }
}

/// Handles one dequeued extraction job end to end (running the document
/// through the extraction pipeline appropriate to its media type).
///
/// Implementations live in the crate wiring extraction, matching, and
/// draft persistence together; this trait only fixes the worker's contract
/// with that orchestration so the pool itself stays decoupled from it.
#[async_trait]
pub trait ExtractionJobHandler: Send + Sync {
    /// Process one job. Errors are logged; retryable errors are retried by
    /// the handler itself using [`retry_async`] around the specific
    /// provider call that failed, not by the pool.
    async fn handle(&self, job: ExtractionJob) -> Result<(), OrderFlowError>;
}

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of concurrent worker tasks.
    pub worker_count: usize,
    /// How long a worker sleeps after finding an empty queue before
    /// polling again.
    pub poll_interval: Duration,
    /// Retry policy applied around each job's handler invocation.
    pub retry: RetryConfig,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { worker_count: 4, poll_interval: Duration::from_millis(200), retry: RetryConfig::default() }
    }
}

/// Spawn `config.worker_count` tokio tasks draining `queue` via `handler`.
///
/// Returns the join handles (for graceful shutdown by the caller) and a
/// shared [`WorkerPoolStats`] snapshot the operator API can read.
pub fn spawn_worker_pool(
    queue: Arc<TenantJobQueue>,
    handler: Arc<dyn ExtractionJobHandler>,
    config: WorkerPoolConfig,
) -> (Vec<JoinHandle<()>>, Arc<WorkerPoolStats>) {
    let stats = Arc::new(WorkerPoolStats::default());
    let mut handles = Vec::with_capacity(config.worker_count);

    for slot in 0..config.worker_count {
        stats.set_idle(slot);
        let queue = Arc::clone(&queue);
        let handler = Arc::clone(&handler);
        let stats = Arc::clone(&stats);
        let config = config.clone();

        let handle = tokio::spawn(async move {
            loop {
                let Some(job) = queue.dequeue() else {
                    tokio::time::sleep(config.poll_interval).await;
                    continue;
                };

                stats.set_busy(slot, job.tenant_id);
                info!(target: "orderflow.daemon.worker", slot, tenant_id = ?job.tenant_id, document_id = ?job.document_id, "picked up extraction job");

                let job_for_retry = job.clone();
                let outcome = retry_async(&config.retry, {
                    let handler = Arc::clone(&handler);
                    move || {
                        let handler = Arc::clone(&handler);
                        let job = job_for_retry.clone();
                        async move { handler.handle(job).await }
                    }
                })
                .await;

                match outcome {
                    Ok(result) => {
                        if !result.metadata.failed_attempts.is_empty() {
                            warn!(target: "orderflow.daemon.worker", slot, attempts = result.metadata.total_attempts, "job succeeded after retries");
                        }
                    }
                    Err(err) => {
                        error!(target: "orderflow.daemon.worker", slot, error = %err, extraction_run_id = ?job.extraction_run_id, "extraction job failed permanently");
                    }
                }

                stats.set_idle(slot);
            }
        });
        handles.push(handle);
    }

    (handles, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::{DocumentId, ExtractionRunId};
    use orderflow_error::ErrorCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct CountingHandler {
        calls: AtomicUsize,
        fail_first_n: usize,
        done: Arc<Notify>,
    }

    #[async_trait]
    impl ExtractionJobHandler for CountingHandler {
        async fn handle(&self, _job: ExtractionJob) -> Result<(), OrderFlowError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first_n {
                return Err(OrderFlowError::new(ErrorCode::ProviderTimeout, "transient"));
            }
            self.done.notify_one();
            Ok(())
        }
    }

    #[tokio::test]
    async fn worker_pool_drains_a_job_and_reports_idle_afterward() {
        let queue = Arc::new(TenantJobQueue::new(10));
        let tenant = TenantId::new();
        queue
            .enqueue(ExtractionJob { extraction_run_id: ExtractionRunId::new(), document_id: DocumentId::new(), tenant_id: tenant })
            .unwrap();

        let done = Arc::new(Notify::new());
        let handler = Arc::new(CountingHandler { calls: AtomicUsize::new(0), fail_first_n: 0, done: Arc::clone(&done) });
        let config = WorkerPoolConfig { worker_count: 1, poll_interval: Duration::from_millis(5), ..Default::default() };
        let (handles, stats) = spawn_worker_pool(Arc::clone(&queue), handler.clone(), config);

        tokio::time::timeout(Duration::from_secs(2), done.notified()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].state, WorkerState::Idle);

        for h in handles {
            h.abort();
        }
    }

    #[tokio::test]
    async fn worker_pool_retries_transient_failures_via_retry_async() {
        let queue = Arc::new(TenantJobQueue::new(10));
        let tenant = TenantId::new();
        queue
            .enqueue(ExtractionJob { extraction_run_id: ExtractionRunId::new(), document_id: DocumentId::new(), tenant_id: tenant })
            .unwrap();

        let done = Arc::new(Notify::new());
        let handler = Arc::new(CountingHandler { calls: AtomicUsize::new(0), fail_first_n: 2, done: Arc::clone(&done) });
        let config = WorkerPoolConfig {
            worker_count: 1,
            poll_interval: Duration::from_millis(5),
            retry: RetryConfig { base_delay: Duration::from_millis(1), jitter_factor: 0.0, ..Default::default() },
        };
        let (handles, _stats) = spawn_worker_pool(Arc::clone(&queue), handler.clone(), config);

        tokio::time::timeout(Duration::from_secs(2), done.notified()).await.unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);

        for h in handles {
            h.abort();
        }
    }
}
