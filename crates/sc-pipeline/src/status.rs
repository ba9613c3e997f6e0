//! The shared progress record for the active job.
//!
//! A [`StatusTracker`] is a cheap cloneable handle. The pipeline writes
//! through it; HTTP pollers read snapshots. Every job gets its own tracker
//! from the [`JobManager`](crate::JobManager), so a job that has been reset
//! keeps writing into a record nobody reads any more.

use std::sync::Arc;

use parking_lot::RwLock;
use sc_core::events::{EventBus, EventPayload};
use sc_core::JobId;
use serde::{Deserialize, Serialize};

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Processing,
    Completed,
    Error,
}

/// Snapshot returned by `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JobStatus {
    pub status: JobState,
    /// 0 to 100, non-decreasing while processing.
    pub progress: u8,
    pub current_step: String,
    pub error: Option<String>,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self {
            status: JobState::Idle,
            progress: 0,
            current_step: String::new(),
            error: None,
        }
    }
}

/// Handle to one job's status record.
#[derive(Clone, Default)]
pub struct StatusTracker {
    inner: Arc<RwLock<JobStatus>>,
    job_id: Option<JobId>,
    events: Option<Arc<EventBus>>,
}

impl StatusTracker {
    /// An idle tracker with no job attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker for `job_id`, publishing lifecycle events to `events`.
    pub fn for_job(job_id: JobId, events: Option<Arc<EventBus>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(JobStatus::default())),
            job_id: Some(job_id),
            events,
        }
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.job_id
    }

    /// Current snapshot.
    pub fn read(&self) -> JobStatus {
        self.inner.read().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.inner.read().status == JobState::Processing
    }

    /// Enter `processing` at 0%.
    pub fn begin(&self) {
        *self.inner.write() = JobStatus {
            status: JobState::Processing,
            progress: 0,
            current_step: "starting".into(),
            error: None,
        };
        self.publish(|job_id| EventPayload::JobStarted { job_id });
    }

    /// Record progress. A value below the stored one keeps the stored one;
    /// the step text is always replaced. Ignored unless processing.
    pub fn update(&self, progress: u8, step: impl Into<String>) {
        let step = step.into();
        let progress = {
            let mut status = self.inner.write();
            if status.status != JobState::Processing {
                return;
            }
            status.progress = status.progress.max(progress.min(100));
            status.current_step = step.clone();
            status.progress
        };
        tracing::debug!("[{progress}%] {step}");
        self.publish(|job_id| EventPayload::JobProgress {
            job_id,
            progress,
            step,
        });
    }

    /// Terminal success at 100%.
    pub fn complete(&self) {
        {
            let mut status = self.inner.write();
            if status.status != JobState::Processing {
                return;
            }
            *status = JobStatus {
                status: JobState::Completed,
                progress: 100,
                current_step: "Processing complete!".into(),
                error: None,
            };
        }
        self.publish(|job_id| EventPayload::JobCompleted { job_id });
    }

    /// Terminal failure. Progress stays where it was.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        {
            let mut status = self.inner.write();
            if status.status != JobState::Processing {
                return;
            }
            status.status = JobState::Error;
            status.current_step = format!("Error: {message}");
            status.error = Some(message.clone());
        }
        self.publish(|job_id| EventPayload::JobFailed {
            job_id,
            error: message,
        });
    }

    /// Publish a per-slide failure without touching the record.
    pub fn slide_failed(&self, stage: &str, slide_number: u32, error: &sc_core::Error) {
        self.publish(|job_id| EventPayload::SlideFailed {
            job_id,
            stage: stage.to_string(),
            slide_number,
            error: error.to_string(),
        });
    }

    fn publish(&self, payload: impl FnOnce(JobId) -> EventPayload) {
        if let (Some(events), Some(job_id)) = (&self.events, self.job_id) {
            events.broadcast(payload(job_id));
        }
    }
}

impl std::fmt::Debug for StatusTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusTracker")
            .field("job_id", &self.job_id)
            .field("status", &*self.inner.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_ignores_updates() {
        let tracker = StatusTracker::new();
        tracker.update(40, "ignored");
        tracker.complete();
        assert_eq!(tracker.read(), JobStatus::default());
    }

    #[test]
    fn progress_never_decreases() {
        let tracker = StatusTracker::new();
        tracker.begin();
        tracker.update(25, "Generating audio for slide 1/2 (attempt 1/3)");
        tracker.update(15, "late");
        let status = tracker.read();
        assert_eq!(status.progress, 25);
        assert_eq!(status.current_step, "late");
        tracker.update(250, "clamped");
        assert_eq!(tracker.read().progress, 100);
    }

    #[test]
    fn failure_freezes_progress() {
        let tracker = StatusTracker::new();
        tracker.begin();
        tracker.update(30, "Generating audio for slide 2/3 (attempt 3/3)");
        tracker.fail("no audio files were generated");

        let status = tracker.read();
        assert_eq!(status.status, JobState::Error);
        assert_eq!(status.progress, 30);
        assert_eq!(status.current_step, "Error: no audio files were generated");
        assert_eq!(status.error.as_deref(), Some("no audio files were generated"));

        tracker.update(90, "after the fact");
        tracker.complete();
        assert_eq!(tracker.read().status, JobState::Error);
        assert_eq!(tracker.read().progress, 30);
    }

    #[test]
    fn completion_resets_error_and_step() {
        let tracker = StatusTracker::new();
        tracker.begin();
        assert_eq!(tracker.read().current_step, "starting");
        tracker.complete();
        let status = tracker.read();
        assert_eq!(status.status, JobState::Completed);
        assert_eq!(status.progress, 100);
        assert_eq!(status.current_step, "Processing complete!");
    }

    #[test]
    fn publishes_lifecycle_events() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let tracker = StatusTracker::for_job(JobId::new(), Some(bus));

        tracker.begin();
        tracker.update(5, "Extracting slides...");
        tracker.complete();

        assert!(matches!(rx.try_recv().unwrap().payload, EventPayload::JobStarted { .. }));
        match rx.try_recv().unwrap().payload {
            EventPayload::JobProgress { progress, .. } => assert_eq!(progress, 5),
            other => panic!("unexpected payload: {other:?}"),
        }
        assert!(matches!(rx.try_recv().unwrap().payload, EventPayload::JobCompleted { .. }));
    }

    #[test]
    fn serializes_lowercase_state() {
        let json = serde_json::to_value(JobStatus::default()).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["error"], serde_json::Value::Null);
    }
}
