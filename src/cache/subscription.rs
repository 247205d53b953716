//! Subscriber handles onto cache entries.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::query::QueryState;

use super::keys::QueryKey;
use super::store::EntityCache;

/// A live view onto one cache entry.
///
/// Holding a subscription keeps the entry eligible for automatic refetch on
/// invalidation. Dropping it releases the subscriber slot.
pub struct Subscription {
    cache: EntityCache,
    key: QueryKey,
    receiver: watch::Receiver<QueryState>,
}

impl Subscription {
    pub(super) fn new(cache: EntityCache, key: QueryKey, receiver: watch::Receiver<QueryState>) -> Self {
        Self {
            cache,
            key,
            receiver,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest state without waiting.
    pub fn current(&self) -> QueryState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state change.
    ///
    /// Intermediate states published faster than the caller polls are
    /// coalesced; the latest one is returned.
    pub async fn changed(&mut self) -> QueryState {
        // The sender lives as long as the entry, and entries with subscribers
        // are never evicted.
        let _ = self.receiver.changed().await;
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until the entry is `Success` or `Error`.
    pub async fn settled(&mut self) -> QueryState {
        let settled = self
            .receiver
            .wait_for(QueryState::is_settled)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.current())
    }

    /// Refetch this entry now.
    pub fn refetch(&self) -> bool {
        self.cache.refetch(&self.key)
    }

    /// Invoke `listener` with the current state and every later change.
    ///
    /// The subscription moves into a background task; the returned handle
    /// stops it.
    pub fn on_change<F>(mut self, mut listener: F) -> Unsubscribe
    where
        F: FnMut(&QueryState) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let initial = self.receiver.borrow_and_update().clone();
            listener(&initial);
            while self.receiver.changed().await.is_ok() {
                let state = self.receiver.borrow_and_update().clone();
                listener(&state);
            }
        });
        Unsubscribe { task }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Stops an [`Subscription::on_change`] listener when dropped.
#[must_use = "dropping the handle unsubscribes immediately"]
pub struct Unsubscribe {
    task: JoinHandle<()>,
}

impl Unsubscribe {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.task.abort();
    }
}
