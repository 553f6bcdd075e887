//! Bounded multi-producer, multi-consumer click queue.
//!
//! Producers never wait: admission is a `try_send` against a fixed-capacity
//! tokio channel, and a full or closed queue simply drops the event. Workers
//! share the single receiver behind an async mutex, so each event is handed
//! to exactly one worker.

use std::sync::{Arc, PoisonError, RwLock};

use metrics::counter;
use tokio::sync::{Mutex, mpsc};

use crate::domain::click_event::ClickEvent;

/// Producer half of the click queue.
pub struct EventQueue {
    sender: RwLock<Option<mpsc::Sender<ClickEvent>>>,
    capacity: usize,
}

/// Consumer half shared by all batch workers.
#[derive(Clone)]
pub struct QueueReceiver {
    inner: Arc<Mutex<mpsc::Receiver<ClickEvent>>>,
}

impl EventQueue {
    /// Creates a queue holding at most `capacity` pending events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or above tokio's semaphore `MAX_PERMITS`;
    /// [`super::PipelineConfig`] bounds it by `MAX_QUEUE_CAPACITY`.
    pub fn bounded(capacity: usize) -> (Self, QueueReceiver) {
        let (tx, rx) = mpsc::channel(capacity);

        let queue = Self {
            sender: RwLock::new(Some(tx)),
            capacity,
        };
        let receiver = QueueReceiver {
            inner: Arc::new(Mutex::new(rx)),
        };

        (queue, receiver)
    }

    /// Admits `event` if there is room and the queue is still open.
    ///
    /// Never blocks. Returns `false` when the event was dropped.
    pub fn try_enqueue(&self, event: ClickEvent) -> bool {
        let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);

        let Some(sender) = guard.as_ref() else {
            counter!("clicks_dropped_total", "reason" => "closed").increment(1);
            return false;
        };

        match sender.try_send(event) {
            Ok(()) => {
                counter!("clicks_enqueued_total").increment(1);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                counter!("clicks_dropped_total", "reason" => "full").increment(1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                counter!("clicks_dropped_total", "reason" => "closed").increment(1);
                false
            }
        }
    }

    /// Stops admissions and lets workers observe end-of-stream once the
    /// remaining events are consumed.
    ///
    /// Returns `true` only for the call that actually closed the queue.
    pub fn close(&self) -> bool {
        let mut guard = self.sender.write().unwrap_or_else(PoisonError::into_inner);
        guard.take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events waiting in the queue; `0` once the queue is closed.
    pub fn len(&self) -> usize {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueueReceiver {
    /// Waits for the next event.
    ///
    /// Returns `None` once the queue is closed and fully drained. Cancel safe:
    /// dropping the future never loses an event.
    pub async fn recv(&self) -> Option<ClickEvent> {
        self.inner.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::click_event::ClickMeta;

    fn event(link_id: i64) -> ClickEvent {
        ClickEvent::now(link_id, ClickMeta::new("127.0.0.1", "test"))
    }

    #[test]
    fn test_try_enqueue_respects_capacity() {
        let (queue, _rx) = EventQueue::bounded(2);

        assert!(queue.try_enqueue(event(1)));
        assert!(queue.try_enqueue(event(2)));
        assert!(!queue.try_enqueue(event(3)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.capacity(), 2);
    }

    #[test]
    fn test_close_is_reported_once() {
        let (queue, _rx) = EventQueue::bounded(4);

        assert!(!queue.is_closed());
        assert!(queue.close());
        assert!(!queue.close());
        assert!(queue.is_closed());
    }

    #[test]
    fn test_closed_queue_rejects_events() {
        let (queue, _rx) = EventQueue::bounded(4);
        queue.close();

        assert!(!queue.try_enqueue(event(1)));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_receiver_drains_then_ends_after_close() {
        let (queue, rx) = EventQueue::bounded(4);
        queue.try_enqueue(event(1));
        queue.try_enqueue(event(2));
        queue.close();

        assert_eq!(rx.recv().await.map(|e| e.link_id), Some(1));
        assert_eq!(rx.recv().await.map(|e| e.link_id), Some(2));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_receiving_frees_capacity() {
        let (queue, rx) = EventQueue::bounded(1);

        assert!(queue.try_enqueue(event(1)));
        assert!(!queue.try_enqueue(event(2)));

        rx.recv().await;
        assert!(queue.try_enqueue(event(3)));
    }

    #[tokio::test]
    async fn test_cloned_receivers_share_events() {
        let (queue, rx) = EventQueue::bounded(4);
        let other = rx.clone();
        queue.try_enqueue(event(1));
        queue.try_enqueue(event(2));

        let first = rx.recv().await.map(|e| e.link_id);
        let second = other.recv().await.map(|e| e.link_id);

        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
    }
}
