//! Click pipeline tuning knobs.

use std::time::Duration;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_BATCH_SIZE: usize = 200;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Largest accepted values; anything above falls back to the default.
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;
pub const MAX_WORKER_COUNT: usize = 1024;
pub const MAX_BATCH_SIZE: usize = 10_000;
pub const MAX_FLUSH_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Immutable configuration of a [`super::ClickPipeline`].
///
/// Construction never fails: a zero value, or one above its `MAX_*` bound,
/// is replaced by its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    queue_capacity: usize,
    worker_count: usize,
    batch_size: usize,
    flush_interval: Duration,
    flush_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(
        queue_capacity: usize,
        worker_count: usize,
        batch_size: usize,
        flush_interval: Duration,
        flush_timeout: Duration,
    ) -> Self {
        Self {
            queue_capacity: within_or(queue_capacity, MAX_QUEUE_CAPACITY, DEFAULT_QUEUE_CAPACITY),
            worker_count: within_or(worker_count, MAX_WORKER_COUNT, DEFAULT_WORKER_COUNT),
            batch_size: within_or(batch_size, MAX_BATCH_SIZE, DEFAULT_BATCH_SIZE),
            flush_interval: within_or(flush_interval, MAX_FLUSH_DURATION, DEFAULT_FLUSH_INTERVAL),
            flush_timeout: within_or(flush_timeout, MAX_FLUSH_DURATION, DEFAULT_FLUSH_TIMEOUT),
        }
    }

    /// Maximum number of events waiting in the queue.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Batch length that triggers an immediate flush.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Per-worker timer period for flushing partial batches.
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Upper bound on a single batch write.
    pub fn flush_timeout(&self) -> Duration {
        self.flush_timeout
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_count: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

fn within_or<T>(value: T, max: T, default: T) -> T
where
    T: PartialOrd + Default,
{
    if value == T::default() || value > max {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = PipelineConfig::default();

        assert_eq!(config.queue_capacity(), 1024);
        assert_eq!(config.worker_count(), 4);
        assert_eq!(config.batch_size(), 200);
        assert_eq!(config.flush_interval(), Duration::from_secs(1));
        assert_eq!(config.flush_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_explicit_values_are_kept() {
        let config = PipelineConfig::new(
            10,
            2,
            5,
            Duration::from_millis(250),
            Duration::from_millis(500),
        );

        assert_eq!(config.queue_capacity(), 10);
        assert_eq!(config.worker_count(), 2);
        assert_eq!(config.batch_size(), 5);
        assert_eq!(config.flush_interval(), Duration::from_millis(250));
        assert_eq!(config.flush_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let config = PipelineConfig::new(0, 0, 0, Duration::ZERO, Duration::ZERO);
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_zero_values() {
        let config = PipelineConfig::new(16, 0, 3, Duration::ZERO, Duration::from_secs(5));

        assert_eq!(config.queue_capacity(), 16);
        assert_eq!(config.worker_count(), DEFAULT_WORKER_COUNT);
        assert_eq!(config.batch_size(), 3);
        assert_eq!(config.flush_interval(), DEFAULT_FLUSH_INTERVAL);
        assert_eq!(config.flush_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_oversized_values_fall_back_to_defaults() {
        let config = PipelineConfig::new(
            usize::MAX,
            usize::MAX,
            usize::MAX,
            Duration::from_millis(u64::MAX),
            Duration::MAX,
        );
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_upper_bounds_are_accepted() {
        let config = PipelineConfig::new(
            MAX_QUEUE_CAPACITY,
            MAX_WORKER_COUNT,
            MAX_BATCH_SIZE,
            MAX_FLUSH_DURATION,
            MAX_FLUSH_DURATION,
        );

        assert_eq!(config.queue_capacity(), MAX_QUEUE_CAPACITY);
        assert_eq!(config.worker_count(), MAX_WORKER_COUNT);
        assert_eq!(config.batch_size(), MAX_BATCH_SIZE);
        assert_eq!(config.flush_interval(), MAX_FLUSH_DURATION);
        assert_eq!(config.flush_timeout(), MAX_FLUSH_DURATION);
    }
}
