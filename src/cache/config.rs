//! Cache configuration.
//!
//! Controls entry eviction and invalidation batching via `libris.toml`.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;

/// Cache configuration from the `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds an entry with no subscribers is kept before eviction.
    /// `None` keeps unused entries for the life of the process.
    pub keep_unused_secs: Option<u64>,
    /// Maximum invalidation events merged into one consumption pass.
    pub consume_batch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_unused_secs: None,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            keep_unused_secs: settings.keep_unused.map(|grace| grace.as_secs()),
            consume_batch_limit: settings.consume_batch_limit.get(),
        }
    }
}

impl CacheConfig {
    /// Grace period before an unused entry is evicted, if eviction is enabled.
    pub fn keep_unused(&self) -> Option<Duration> {
        self.keep_unused_secs.map(Duration::from_secs)
    }

    /// Batch limit clamped to at least one event.
    pub fn consume_batch_limit(&self) -> usize {
        self.consume_batch_limit.max(1)
    }
}
