//! Click-event ingestion and batch persistence.
//!
//! ```text
//! resolve ──enqueue──▶ EventQueue (bounded, drop when full)
//!                          │
//!            ┌─────────────┼─────────────┐
//!            ▼             ▼             ▼
//!       BatchWorker   BatchWorker   BatchWorker    (local batch + timer each)
//!            │             │             │
//!            └──── insert_clicks (size or time trigger, bounded write) ──▶ ClickRepository
//! ```
//!
//! - [`config`] - [`PipelineConfig`], defaults applied to non-positive values
//! - [`queue`] - non-blocking admission and the shared receiver
//! - [`worker`] - per-worker batching and flush policy
//! - [`controller`] - [`ClickPipeline`] lifecycle and the shutdown barrier
//!
//! Delivery is best-effort: a full queue drops new clicks, and a failed or
//! timed-out batch write drops the whole batch without retry.

pub mod config;
pub mod controller;
pub mod queue;
pub mod worker;

pub use config::PipelineConfig;
pub use controller::{ClickPipeline, PipelineState, ShutdownError};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::domain::click_event::{ClickEvent, ClickMeta};
    use crate::domain::repositories::ClickRepository;
    use crate::error::AppError;

    pub fn click(link_id: i64) -> ClickEvent {
        ClickEvent::now(link_id, ClickMeta::new("127.0.0.1", "test-agent"))
    }

    /// Records every write attempt; can be told to fail, hang or panic.
    #[derive(Default)]
    pub struct RecordingRepository {
        batches: Mutex<Vec<Vec<ClickEvent>>>,
        pub fail: AtomicBool,
        pub hang: AtomicBool,
        pub panic: AtomicBool,
    }

    impl RecordingRepository {
        pub fn attempts(&self) -> usize {
            self.batches.lock().unwrap().len()
        }

        pub fn batch_link_ids(&self) -> Vec<Vec<i64>> {
            self.batches
                .lock()
                .unwrap()
                .iter()
                .map(|batch| batch.iter().map(|e| e.link_id).collect())
                .collect()
        }
    }

    #[async_trait]
    impl ClickRepository for RecordingRepository {
        async fn insert_clicks(&self, batch: &[ClickEvent]) -> Result<(), AppError> {
            if self.panic.load(Ordering::SeqCst) {
                panic!("click repository panicked");
            }
            self.batches.lock().unwrap().push(batch.to_vec());

            if self.hang.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::internal("write failed", json!({})));
            }
            Ok(())
        }

        async fn total_clicks(&self, _code: &str) -> Result<Option<i64>, AppError> {
            Ok(Some(self.batches.lock().unwrap().iter().map(Vec::len).sum::<usize>() as i64))
        }
    }
}
