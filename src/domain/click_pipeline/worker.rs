//! Batch worker: coalesces queued click events and flushes them on a
//! size-or-time trigger.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::config::{DEFAULT_BATCH_SIZE, PipelineConfig};
use super::queue::QueueReceiver;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushTrigger {
    Size,
    Interval,
    Drain,
}

impl FlushTrigger {
    fn as_str(self) -> &'static str {
        match self {
            FlushTrigger::Size => "size",
            FlushTrigger::Interval => "interval",
            FlushTrigger::Drain => "drain",
        }
    }
}

/// One member of the worker pool.
///
/// The batch and the flush timer are owned by the worker alone; the queue
/// receiver is the only state shared with other workers.
pub struct BatchWorker {
    id: usize,
    receiver: QueueReceiver,
    repository: Arc<dyn ClickRepository>,
    batch: Vec<ClickEvent>,
    batch_size: usize,
    flush_interval: Duration,
    flush_timeout: Duration,
}

impl BatchWorker {
    pub fn new(
        id: usize,
        receiver: QueueReceiver,
        repository: Arc<dyn ClickRepository>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            id,
            receiver,
            repository,
            batch: Vec::with_capacity(config.batch_size().min(DEFAULT_BATCH_SIZE)),
            batch_size: config.batch_size(),
            flush_interval: config.flush_interval(),
            flush_timeout: config.flush_timeout(),
        }
    }

    /// Runs until the queue is closed and drained, then flushes what is left.
    pub async fn run(mut self) {
        let mut ticker = time::interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(worker = self.id, "click worker started");

        loop {
            tokio::select! {
                received = self.receiver.recv() => match received {
                    Some(event) => {
                        self.batch.push(event);
                        if self.batch.len() >= self.batch_size {
                            self.flush(FlushTrigger::Size).await;
                            ticker.reset();
                        }
                    }
                    None => {
                        self.flush(FlushTrigger::Drain).await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.flush(FlushTrigger::Interval).await;
                }
            }
        }

        debug!(worker = self.id, "click worker finished");
    }

    /// Writes the current batch with a bounded deadline.
    ///
    /// The batch is cleared whatever the outcome: a failed or timed-out write
    /// loses its clicks.
    async fn flush(&mut self, trigger: FlushTrigger) {
        if self.batch.is_empty() {
            return;
        }

        let size = self.batch.len();
        let write = self.repository.insert_clicks(&self.batch);

        match time::timeout(self.flush_timeout, write).await {
            Ok(Ok(())) => {
                debug!(
                    worker = self.id,
                    batch_size = size,
                    trigger = trigger.as_str(),
                    "click batch persisted"
                );
                counter!("click_batches_flushed_total").increment(1);
                counter!("clicks_persisted_total").increment(size as u64);
            }
            Ok(Err(e)) => {
                warn!(
                    worker = self.id,
                    batch_size = size,
                    trigger = trigger.as_str(),
                    error = %e,
                    "failed to persist click batch, dropping it"
                );
                counter!("click_batch_failures_total", "reason" => "error").increment(1);
                counter!("clicks_dropped_total", "reason" => "flush_failed").increment(size as u64);
            }
            Err(_) => {
                warn!(
                    worker = self.id,
                    batch_size = size,
                    trigger = trigger.as_str(),
                    timeout_ms = self.flush_timeout.as_millis() as u64,
                    "click batch write timed out, dropping it"
                );
                counter!("click_batch_failures_total", "reason" => "timeout").increment(1);
                counter!("clicks_dropped_total", "reason" => "flush_failed").increment(size as u64);
            }
        }

        self.batch.clear();
    }
}
