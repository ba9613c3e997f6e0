//! Job admission, reset and cancellation.
//!
//! Only one job runs at a time. [`JobManager::admit`] refuses a new job while
//! the current one is processing; [`JobManager::reset`] cancels the active
//! job and installs a fresh idle record.

use std::sync::Arc;

use parking_lot::RwLock;
use sc_core::events::{EventBus, EventPayload};
use sc_core::JobId;
use tokio_util::sync::CancellationToken;

use crate::status::{JobStatus, StatusTracker};

/// Everything a running job needs to report and observe cancellation.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub id: JobId,
    pub status: StatusTracker,
    pub cancel: CancellationToken,
}

impl JobHandle {
    /// A standalone job, not registered with any manager.
    pub fn detached() -> Self {
        let id = JobId::new();
        let status = StatusTracker::for_job(id, None);
        status.begin();
        Self {
            id,
            status,
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Active {
    tracker: StatusTracker,
    cancel: Option<CancellationToken>,
}

/// Owns the status record observers read.
#[derive(Debug, Default)]
pub struct JobManager {
    active: RwLock<Active>,
    events: Option<Arc<EventBus>>,
}

impl JobManager {
    pub fn new(events: Option<Arc<EventBus>>) -> Self {
        Self {
            active: RwLock::new(Active::default()),
            events,
        }
    }

    /// Start a new job, or fail with [`Conflict`](sc_core::Error::Conflict)
    /// while another is processing.
    pub fn admit(&self) -> sc_core::Result<JobHandle> {
        let mut active = self.active.write();
        if active.tracker.is_processing() {
            return Err(sc_core::Error::Conflict(
                "a presentation is already being processed".into(),
            ));
        }

        let id = JobId::new();
        let tracker = StatusTracker::for_job(id, self.events.clone());
        let cancel = CancellationToken::new();
        tracker.begin();

        *active = Active {
            tracker: tracker.clone(),
            cancel: Some(cancel.clone()),
        };
        tracing::info!(job_id = %id, "Job admitted");

        Ok(JobHandle {
            id,
            status: tracker,
            cancel,
        })
    }

    /// Snapshot of the current job's status.
    pub fn status(&self) -> JobStatus {
        self.active.read().tracker.read()
    }

    pub fn current_job(&self) -> Option<JobId> {
        self.active.read().tracker.job_id()
    }

    /// Cancel the active job (if any) and go back to idle.
    ///
    /// Returns whether a processing job was cancelled.
    pub fn reset(&self) -> bool {
        let previous = std::mem::take(&mut *self.active.write());
        let was_processing = previous.tracker.is_processing();
        if let Some(cancel) = previous.cancel {
            cancel.cancel();
        }
        if let Some(job_id) = previous.tracker.job_id() {
            tracing::info!(job_id = %job_id, was_processing, "Job reset");
        }
        if let Some(ref events) = self.events {
            events.broadcast(EventPayload::JobReset);
        }
        was_processing
    }

    /// Cancel the active job without touching the status record.
    pub fn cancel_active(&self) {
        if let Some(ref cancel) = self.active.read().cancel {
            cancel.cancel();
        }
    }
}
