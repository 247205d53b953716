//! Cache event system.
//!
//! Successful mutations publish events here; the invalidation consumer drains
//! them and turns them into tag invalidations.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::gauge;
use tracing::info;
use uuid::Uuid;

use super::keys::{MutationKind, TagSet};
use super::lock::mutex_lock;

const SOURCE: &str = "cache::events";

const METRIC_QUEUE_LEN: &str = "libris_invalidation_queue_len";

/// Monotonic epoch for ordering events within this process.
pub type Epoch = u64;

/// One queued invalidation request.
#[derive(Debug, Clone)]
pub struct CacheEvent {
    /// Unique identifier; the planner drops repeated ids.
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
        }
    }

    /// Tags this event invalidates.
    pub fn tags(&self) -> TagSet {
        self.kind.tags()
    }
}

/// Why cached data became stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A mutation completed successfully.
    MutationSucceeded { mutation: MutationKind },
    /// Tags were invalidated by hand, e.g. a manual refresh.
    TagsInvalidated { tags: TagSet },
}

impl EventKind {
    pub fn tags(&self) -> TagSet {
        match self {
            EventKind::MutationSucceeded { mutation } => mutation.invalidates_tags(),
            EventKind::TagsInvalidated { tags } => tags.clone(),
        }
    }

    /// Short label for logs and plan summaries.
    pub fn origin(&self) -> String {
        match self {
            EventKind::MutationSucceeded { mutation } => mutation.to_string(),
            EventKind::TagsInvalidated { .. } => "manual".to_string(),
        }
    }
}

/// In-memory FIFO of pending invalidations.
pub struct EventQueue {
    queue: Mutex<VecDeque<CacheEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Publish an event and return it.
    pub fn publish(&self, kind: EventKind) -> CacheEvent {
        let event = CacheEvent::new(kind, self.next_epoch());

        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?event.kind,
            "Invalidation event enqueued"
        );

        let mut queue = mutex_lock(&self.queue, SOURCE, "publish");
        queue.push_back(event.clone());
        gauge!(METRIC_QUEUE_LEN).set(queue.len() as f64);
        event
    }

    /// Drain up to `limit` events in FIFO order.
    pub fn drain(&self, limit: usize) -> Vec<CacheEvent> {
        let mut queue = mutex_lock(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        let events: Vec<_> = queue.drain(..count).collect();
        gauge!(METRIC_QUEUE_LEN).set(queue.len() as f64);
        events
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
