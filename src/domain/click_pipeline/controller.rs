//! Pipeline controller: owns the queue, the worker pool, and the shutdown
//! protocol.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time;
use tracing::{error, info, warn};

use super::config::PipelineConfig;
use super::queue::EventQueue;
use super::worker::BatchWorker;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Lifecycle of a [`ClickPipeline`].
///
/// `Running -> Draining` happens once, on the first shutdown request.
/// `Draining -> Stopped` happens when every worker has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    Draining,
    Stopped,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Running => "running",
            PipelineState::Draining => "draining",
            PipelineState::Stopped => "stopped",
        }
    }
}

/// Outcome of a shutdown that did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShutdownError {
    #[error("click pipeline did not drain within {0:?}")]
    Timeout(Duration),
}

/// Best-effort click ingestion pipeline.
///
/// `enqueue` never waits; `shutdown` closes the queue and waits, up to a
/// deadline, for the workers to flush what they hold.
pub struct ClickPipeline {
    config: PipelineConfig,
    queue: Arc<EventQueue>,
    state: Arc<watch::Sender<PipelineState>>,
}

impl ClickPipeline {
    /// Builds the queue and spawns the worker pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: PipelineConfig, repository: Arc<dyn ClickRepository>) -> Self {
        let (queue, receiver) = EventQueue::bounded(config.queue_capacity());
        let queue = Arc::new(queue);
        let state = Arc::new(watch::Sender::new(PipelineState::Running));

        let mut workers = JoinSet::new();
        for id in 0..config.worker_count() {
            let worker = BatchWorker::new(id, receiver.clone(), repository.clone(), &config);
            workers.spawn(worker.run());
        }

        tokio::spawn(supervise(workers, queue.clone(), state.clone()));

        info!(
            queue_capacity = config.queue_capacity(),
            workers = config.worker_count(),
            batch_size = config.batch_size(),
            flush_interval_ms = config.flush_interval().as_millis() as u64,
            flush_timeout_ms = config.flush_timeout().as_millis() as u64,
            "click pipeline started"
        );

        Self {
            config,
            queue,
            state,
        }
    }

    /// Hands a click to the worker pool without waiting.
    ///
    /// Returns `false` if the queue is full or the pipeline is no longer running.
    pub fn enqueue(&self, event: ClickEvent) -> bool {
        if self.state() != PipelineState::Running {
            counter!("clicks_dropped_total", "reason" => "closed").increment(1);
            return false;
        }
        self.queue.try_enqueue(event)
    }

    /// Stops admissions and waits for the workers to finish, at most `deadline`.
    ///
    /// Safe to call any number of times, concurrently or not: only the first
    /// call closes the queue, every call waits for the same completion. On
    /// timeout the workers keep running in the background.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Timeout`] if the workers are still running when
    /// `deadline` elapses.
    pub async fn shutdown(&self, deadline: Duration) -> Result<(), ShutdownError> {
        if begin_draining(&self.queue, &self.state) {
            info!("click pipeline draining");
        }

        let mut state = self.state.subscribe();
        let stopped = time::timeout(
            deadline,
            state.wait_for(|s| *s == PipelineState::Stopped),
        )
        .await
        .is_ok();

        if stopped {
            Ok(())
        } else {
            warn!(
                deadline_ms = deadline.as_millis() as u64,
                "click pipeline shutdown timed out, workers continue in background"
            );
            Err(ShutdownError::Timeout(deadline))
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Queue capacity.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Events currently waiting for a worker.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

/// Closes the queue and moves `Running -> Draining`.
///
/// Returns `true` only for the call that closed the queue.
fn begin_draining(queue: &EventQueue, state: &watch::Sender<PipelineState>) -> bool {
    if !queue.close() {
        return false;
    }
    state.send_if_modified(|state| {
        if *state == PipelineState::Running {
            *state = PipelineState::Draining;
            true
        } else {
            false
        }
    });
    true
}

/// Joins every worker, then publishes `Stopped`.
///
/// A panicked worker counts as exited. If every worker is gone before any
/// shutdown request, the queue is closed here so nothing is admitted that no
/// worker would ever read.
async fn supervise(
    mut workers: JoinSet<()>,
    queue: Arc<EventQueue>,
    state: Arc<watch::Sender<PipelineState>>,
) {
    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            error!(error = %e, "click worker terminated abnormally");
        }
    }

    if begin_draining(&queue, &state) {
        warn!("all click workers exited before shutdown, queue closed");
    }
    state.send_replace(PipelineState::Stopped);
    info!("click pipeline stopped");
}
