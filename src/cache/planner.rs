//! Invalidation plan generation.
//!
//! Merges a batch of cache events into one set of tags to invalidate.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::events::{CacheEvent, Epoch};
use super::keys::{Tag, TagSet};

/// Tags to invalidate for one consumption pass.
#[derive(Debug, Default)]
pub struct InvalidationPlan {
    /// Union of every event's tags.
    pub tags: TagSet,
    /// Events merged into this plan, after dropping repeated ids.
    pub event_count: usize,
    /// Distinct origins, for logs.
    pub origins: BTreeSet<String>,
    /// Newest epoch merged into this plan.
    pub latest_epoch: Option<Epoch>,
}

impl fmt::Display for InvalidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: BTreeSet<Tag> = self.tags.iter().copied().collect();
        let tags: Vec<String> = tags.iter().map(Tag::to_string).collect();
        let origins: Vec<&str> = self.origins.iter().map(String::as_str).collect();
        write!(f, "InvalidationPlan {{ events: {}, ", self.event_count)?;
        if let Some(epoch) = self.latest_epoch {
            write!(f, "latest_epoch: {epoch}, ")?;
        }
        write!(
            f,
            "tags: [{}], origins: [{}] }}",
            tags.join(", "),
            origins.join(", "),
        )
    }
}

impl InvalidationPlan {
    /// Merge events into a plan, deduplicating by event id.
    ///
    /// Events are applied in epoch order whatever order they were drained in.
    pub fn from_events(mut events: Vec<CacheEvent>) -> Self {
        let mut plan = Self::default();
        let mut seen_ids = HashSet::new();

        events.sort_by_key(|e| e.epoch);
        for event in events.into_iter().filter(|e| seen_ids.insert(e.id)) {
            plan.event_count += 1;
            plan.tags.extend(event.tags());
            plan.origins.insert(event.kind.origin());
            plan.latest_epoch = Some(event.epoch);
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
