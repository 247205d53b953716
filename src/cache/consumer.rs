//! Invalidation consumer.
//!
//! Drains events from the queue, merges them into a plan and applies the
//! plan to the entity cache.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{info, instrument};
use uuid::Uuid;

use super::config::CacheConfig;
use super::events::EventQueue;
use super::planner::InvalidationPlan;
use super::store::{EntityCache, Invalidation};

const METRIC_CONSUME_MS: &str = "libris_invalidation_consume_ms";

pub struct InvalidationConsumer {
    config: CacheConfig,
    queue: Arc<EventQueue>,
    cache: EntityCache,
}

impl InvalidationConsumer {
    pub fn new(config: CacheConfig, queue: Arc<EventQueue>, cache: EntityCache) -> Self {
        Self {
            config,
            queue,
            cache,
        }
    }

    /// Consume every pending event, one batch at a time.
    ///
    /// Returns the merged outcome, or `None` when the queue was empty.
    #[instrument(skip(self))]
    pub fn consume(&self) -> Option<Invalidation> {
        let mut merged: Option<Invalidation> = None;
        while let Some(outcome) = self.consume_batch() {
            let total = merged.get_or_insert_with(Invalidation::default);
            total.stale.extend(outcome.stale);
            total.refetching.extend(outcome.refetching);
        }
        merged
    }

    /// Consume at most one batch of events.
    pub fn consume_batch(&self) -> Option<Invalidation> {
        let started_at = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit());
        if events.is_empty() {
            return None;
        }

        let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let plan = InvalidationPlan::from_events(events);

        info!(
            event_count = plan.event_count,
            event_ids = ?event_ids,
            plan = %plan,
            "Invalidation consumption starting"
        );

        let outcome = if plan.is_empty() {
            Invalidation::default()
        } else {
            self.cache.invalidate(&plan.tags)
        };

        info!(
            event_count = plan.event_count,
            latest_epoch = ?plan.latest_epoch,
            stale = outcome.stale.len(),
            refetching = outcome.refetching.len(),
            "Invalidation consumption complete"
        );

        histogram!(METRIC_CONSUME_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        Some(outcome)
    }
}
