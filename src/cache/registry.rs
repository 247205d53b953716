//! Bidirectional tag registry.
//!
//! Tracks which cached queries provide which tags, enabling invalidation by
//! tag without scanning every entry.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::keys::{QueryKey, Tag, TagSet};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::registry";

/// Tracks tag → query keys and query key → tags mappings.
pub struct CacheRegistry {
    /// Maps tags to every query key that provides them
    tag_to_keys: RwLock<HashMap<Tag, HashSet<QueryKey>>>,
    /// Maps query keys to the tags they provide
    key_to_tags: RwLock<HashMap<QueryKey, TagSet>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self {
            tag_to_keys: RwLock::new(HashMap::new()),
            key_to_tags: RwLock::new(HashMap::new()),
        }
    }

    /// Register a query key with the tags it provides.
    ///
    /// Re-registering a key replaces its previous tag set.
    pub fn register(&self, key: QueryKey, tags: TagSet) {
        self.unregister(&key);

        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "register.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "register.key_to_tags");

        for tag in &tags {
            t2k.entry(*tag).or_default().insert(key.clone());
        }
        k2t.insert(key, tags);
    }

    /// All query keys providing at least one of `tags`.
    pub fn keys_for_tags(&self, tags: &TagSet) -> HashSet<QueryKey> {
        let t2k = rw_read(&self.tag_to_keys, SOURCE, "keys_for_tags");
        tags.iter()
            .filter_map(|tag| t2k.get(tag))
            .flat_map(|keys| keys.iter().cloned())
            .collect()
    }

    /// Remove a query key and clean up tag mappings.
    ///
    /// Called when a cache entry is evicted.
    pub fn unregister(&self, key: &QueryKey) {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "unregister.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "unregister.key_to_tags");

        if let Some(tags) = k2t.remove(key) {
            for tag in tags {
                if let Some(keys) = t2k.get_mut(&tag) {
                    keys.remove(key);
                    if keys.is_empty() {
                        t2k.remove(&tag);
                    }
                }
            }
        }
    }

    /// Number of registered query keys.
    pub fn key_count(&self) -> usize {
        rw_read(&self.key_to_tags, SOURCE, "key_count").len()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}
