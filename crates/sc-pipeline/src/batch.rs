//! Bounded per-slide retries with engine resets between attempts.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheGate;
use crate::status::StatusTracker;

/// One unit of work: produce `output` for `slide_number` from `payload`.
#[derive(Debug, Clone)]
pub struct BatchItem<T> {
    pub slide_number: u32,
    pub output: PathBuf,
    pub payload: T,
}

/// The per-item work of a stage.
#[async_trait]
pub trait Producer: Send + Sync {
    type Payload: Send + Sync;

    /// Stage name for logs and events, e.g. `synthesis`.
    fn stage(&self) -> &str;

    /// Lead of the progress text, e.g. `Generating audio`.
    fn action(&self) -> &str;

    async fn produce(&self, item: &BatchItem<Self::Payload>) -> sc_core::Result<()>;

    /// Reinitialize the underlying engine.
    async fn reset(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait between a failed attempt and the next one.
    pub backoff: Duration,
    /// Wait after a successful item.
    pub settle: Duration,
    /// Upper bound on a single produce call.
    pub timeout: Option<Duration>,
}

/// A stage's share of the global 0..100 progress scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressWindow {
    pub start: u8,
    pub end: u8,
}

impl ProgressWindow {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Progress for item `index` of `total`.
    pub fn at(&self, index: usize, total: usize) -> u8 {
        if total == 0 {
            return self.start;
        }
        let span = self.end.saturating_sub(self.start) as usize;
        self.start + (index.min(total) * span / total) as u8
    }
}

/// What happened to a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Slide numbers with a present output, cached ones included.
    pub succeeded: Vec<u32>,
    /// Subset of `succeeded` that was reused from disk.
    pub skipped: Vec<u32>,
    /// Permanently failed slides with the last error message.
    pub failed: Vec<(u32, String)>,
    /// Produce calls made.
    pub attempts: u32,
    pub cancelled: bool,
}

/// Runs a [`Producer`] over a batch of items.
pub struct BatchRunner<'a> {
    pub policy: RetryPolicy,
    pub cache: CacheGate,
    pub window: ProgressWindow,
    pub status: &'a StatusTracker,
    pub cancel: &'a CancellationToken,
}

impl BatchRunner<'_> {
    /// Process `items` in ascending slide order.
    ///
    /// A failed item never stops the batch; only cancellation does.
    pub async fn run<P: Producer>(
        &self,
        mut items: Vec<BatchItem<P::Payload>>,
        producer: &P,
    ) -> BatchOutcome {
        items.sort_by_key(|item| item.slide_number);
        let total = items.len();
        let mut outcome = BatchOutcome::default();

        for (index, item) in items.iter().enumerate() {
            if self.cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let position = index + 1;
            let progress = self.window.at(index, total);

            if self.cache.should_skip(&item.output) {
                self.status.update(
                    progress,
                    format!(
                        "{} for slide {position}/{total} (already done)",
                        producer.action()
                    ),
                );
                tracing::info!(
                    slide = item.slide_number,
                    "{}: reusing {}",
                    producer.stage(),
                    item.output.display()
                );
                outcome.succeeded.push(item.slide_number);
                outcome.skipped.push(item.slide_number);
                continue;
            }

            match self
                .run_item(producer, item, progress, position, total, &mut outcome)
                .await
            {
                Ok(()) => outcome.succeeded.push(item.slide_number),
                Err(sc_core::Error::Cancelled) => {
                    outcome.cancelled = true;
                    break;
                }
                Err(e) => {
                    tracing::error!(
                        slide = item.slide_number,
                        "{} failed permanently: {e}",
                        producer.stage()
                    );
                    self.status
                        .slide_failed(producer.stage(), item.slide_number, &e);
                    outcome.failed.push((item.slide_number, e.to_string()));
                }
            }
        }

        tracing::info!(
            "{}: {} succeeded ({} reused), {} failed",
            producer.stage(),
            outcome.succeeded.len(),
            outcome.skipped.len(),
            outcome.failed.len()
        );
        outcome
    }

    async fn run_item<P: Producer>(
        &self,
        producer: &P,
        item: &BatchItem<P::Payload>,
        progress: u8,
        position: usize,
        total: usize,
        outcome: &mut BatchOutcome,
    ) -> sc_core::Result<()> {
        let max = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            if self.cancel.is_cancelled() {
                return Err(sc_core::Error::Cancelled);
            }
            self.status.update(
                progress,
                format!(
                    "{} for slide {position}/{total} (attempt {attempt}/{max})",
                    producer.action()
                ),
            );
            outcome.attempts += 1;

            match self.call(producer, item).await {
                Ok(()) => {
                    tracing::info!(
                        slide = item.slide_number,
                        attempt,
                        "{}: wrote {}",
                        producer.stage(),
                        item.output.display()
                    );
                    self.status.update(
                        progress,
                        format!(
                            "Finished {} for slide {position}/{total}, moving to next slide",
                            producer.stage()
                        ),
                    );
                    producer.reset().await;
                    self.pause(self.policy.settle).await;
                    return Ok(());
                }
                Err(sc_core::Error::Cancelled) => return Err(sc_core::Error::Cancelled),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        slide = item.slide_number,
                        attempt,
                        "{} attempt {attempt}/{max} failed: {e}",
                        producer.stage()
                    );
                    if attempt >= max {
                        return Err(e);
                    }
                    producer.reset().await;
                    if !self.pause(self.policy.backoff).await {
                        return Err(sc_core::Error::Cancelled);
                    }
                }
            }
        }
    }

    async fn call<P: Producer>(
        &self,
        producer: &P,
        item: &BatchItem<P::Payload>,
    ) -> sc_core::Result<()> {
        let work = async {
            match self.policy.timeout {
                Some(limit) => tokio::time::timeout(limit, producer.produce(item))
                    .await
                    .unwrap_or_else(|_| {
                        Err(sc_core::Error::pipeline(
                            producer.stage(),
                            format!("timed out after {limit:?}"),
                        ))
                    }),
                None => producer.produce(item).await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(sc_core::Error::Cancelled),
            result = work => result,
        }
    }

    /// Sleep for `duration`; false if cancelled first.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
