// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bounded per-tenant extraction job queue (§5), partitioned by tenant so
//! one noisy tenant cannot starve another's extraction runs.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Mutex;

use orderflow_core::{DocumentId, ExtractionRunId, TenantId};

/// One extraction job waiting to be picked up by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    /// The run this job corresponds to.
    pub extraction_run_id: ExtractionRunId,
    /// The document to extract.
    pub document_id: DocumentId,
    /// Tenant the job belongs to.
    pub tenant_id: TenantId,
}

/// Errors returned by [`TenantJobQueue::enqueue`].
#[derive(Debug)]
pub enum QueueError {
    /// This tenant's queue has reached its per-tenant capacity. Per §5
    /// backpressure semantics, this is not fatal to intake — the caller
    /// stores the document and reports a transient-failure extraction
    /// status to be drained by workers later.
    TenantQueueFull {
        /// Tenant whose queue is full.
        tenant_id: TenantId,
        /// Per-tenant capacity.
        max: usize,
    },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TenantQueueFull { tenant_id, max } => {
                write!(f, "tenant {tenant_id:?} extraction queue is full (max {max})")
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// Snapshot statistics for one tenant's queue.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TenantQueueStats {
    /// Tenant the stats are for.
    pub tenant_id: TenantId,
    /// Jobs currently queued for this tenant.
    pub queued: usize,
    /// Per-tenant capacity.
    pub max: usize,
}

/// A bounded, per-tenant FIFO extraction job queue.
///
/// Dequeues round-robin across tenants with non-empty queues so no single
/// tenant can monopolize worker attention, with FIFO ordering preserved
/// within each tenant's own queue.
pub struct TenantJobQueue {
    max_per_tenant: usize,
    queues: Mutex<BTreeMap<TenantId, VecDeque<ExtractionJob>>>,
    /// Tenant order for round-robin dequeue; rotated after each dequeue.
    rotation: Mutex<VecDeque<TenantId>>,
}

impl TenantJobQueue {
    /// Create a new queue with the given per-tenant capacity.
    #[must_use]
    pub fn new(max_per_tenant: usize) -> Self {
        Self { max_per_tenant, queues: Mutex::new(BTreeMap::new()), rotation: Mutex::new(VecDeque::new()) }
    }

    /// Enqueue a job for its tenant, failing if that tenant's queue is
    /// already at capacity.
    pub fn enqueue(&self, job: ExtractionJob) -> Result<(), QueueError> {
        let mut queues = self.queues.lock().expect("queue lock poisoned");
        let tenant_queue = queues.entry(job.tenant_id).or_default();
        if tenant_queue.len() >= self.max_per_tenant {
            return Err(QueueError::TenantQueueFull { tenant_id: job.tenant_id, max: self.max_per_tenant });
        }
        let was_empty = tenant_queue.is_empty();
        tenant_queue.push_back(job.clone());
        if was_empty {
            self.rotation.lock().expect("rotation lock poisoned").push_back(job.tenant_id);
        }
        Ok(())
    }

    /// Dequeue the next job, rotating to the next non-empty tenant each
    /// call. Returns `None` if every tenant's queue is empty.
    pub fn dequeue(&self) -> Option<ExtractionJob> {
        let mut rotation = self.rotation.lock().expect("rotation lock poisoned");
        let mut queues = self.queues.lock().expect("queue lock poisoned");

        for _ in 0..rotation.len() {
            let tenant_id = rotation.pop_front()?;
            let Some(tenant_queue) = queues.get_mut(&tenant_id) else { continue };
            let Some(job) = tenant_queue.pop_front() else { continue };
            if !tenant_queue.is_empty() {
                rotation.push_back(tenant_id);
            }
            return Some(job);
        }
        None
    }

    /// Total jobs queued across every tenant.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.lock().expect("queue lock poisoned").values().map(VecDeque::len).sum()
    }

    /// `true` if no tenant has a queued job.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-tenant snapshot statistics, for the operator API.
    #[must_use]
    pub fn stats(&self) -> Vec<TenantQueueStats> {
        self.queues
            .lock()
            .expect("queue lock poisoned")
            .iter()
            .map(|(tenant_id, q)| TenantQueueStats { tenant_id: *tenant_id, queued: q.len(), max: self.max_per_tenant })
            .collect()
    }
}
