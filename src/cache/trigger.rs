//! Invalidation trigger.
//!
//! Entry point for write paths: publish an event and consume it before
//! returning so the next read observes the invalidation.

use std::sync::Arc;

use tracing::debug;

use super::consumer::InvalidationConsumer;
use super::events::{EventKind, EventQueue};
use super::keys::{MutationKind, TagSet};
use super::store::Invalidation;

/// Publishes invalidation events for successful writes.
///
/// ```ignore
/// // after a successful borrow:
/// trigger.mutation_succeeded(MutationKind::BorrowBook);
/// ```
pub struct InvalidationTrigger {
    queue: Arc<EventQueue>,
    consumer: Arc<InvalidationConsumer>,
}

impl InvalidationTrigger {
    pub fn new(queue: Arc<EventQueue>, consumer: Arc<InvalidationConsumer>) -> Self {
        Self { queue, consumer }
    }

    fn publish_and_consume(&self, kind: EventKind) -> Option<Invalidation> {
        let event = self.queue.publish(kind);
        debug!(event_id = %event.id, event_epoch = event.epoch, "Consuming invalidation");
        self.consumer.consume()
    }

    /// Invalidate everything `mutation` affects.
    pub fn mutation_succeeded(&self, mutation: MutationKind) -> Option<Invalidation> {
        self.publish_and_consume(EventKind::MutationSucceeded { mutation })
    }

    /// Invalidate `tags` outside of any mutation.
    pub fn invalidate_tags(&self, tags: TagSet) -> Option<Invalidation> {
        self.publish_and_consume(EventKind::TagsInvalidated { tags })
    }
}
