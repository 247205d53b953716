//! Entity cache and tag invalidation.
//!
//! - **Store**: one entry per [`QueryKey`], shared by every reader of that key,
//!   with at most one in-flight fetch at a time.
//! - **Invalidation**: successful mutations publish events; the consumer merges
//!   them into tags and marks every entry providing those tags stale.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! keep_unused_secs = 60        # omit to keep unused entries forever
//! consume_batch_limit = 100
//! ```

mod config;
mod consumer;
mod events;
mod keys;
mod lock;
mod planner;
mod registry;
mod store;
mod subscription;
mod trigger;

pub use config::CacheConfig;
pub use consumer::InvalidationConsumer;
pub use events::{CacheEvent, Epoch, EventKind, EventQueue};
pub use keys::{MutationKind, QueryKey, Tag, TagSet, tags};
pub use planner::InvalidationPlan;
pub use registry::CacheRegistry;
pub use store::{EntityCache, FetchResult, Fetcher, Invalidation};
pub use subscription::{Subscription, Unsubscribe};
pub use trigger::InvalidationTrigger;
