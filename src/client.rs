//! Application context: owns the transport, the entity cache and the
//! invalidation pipeline for the lifetime of the process.

use std::sync::Arc;

use libris_api_types::Book;

use crate::cache::{
    CacheConfig, CacheRegistry, EntityCache, EventQueue, Invalidation, InvalidationConsumer,
    InvalidationTrigger, QueryKey, TagSet,
};
use crate::config::Settings;
use crate::endpoints::{self, BorrowBook, CreateBook, DeleteBook, UpdateBook};
use crate::query::{
    BookQuery, BooksQuery, BorrowSummariesQuery, Mutation, MutationEndpoint, Query, QueryData,
};
use crate::transport::{HttpTransport, Transport, TransportError};

/// Entry point for reading and writing the catalog.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct LibraryClient {
    transport: Arc<dyn Transport>,
    cache: EntityCache,
    trigger: Arc<InvalidationTrigger>,
}

impl LibraryClient {
    pub fn new(transport: Arc<dyn Transport>, config: CacheConfig) -> Self {
        let registry = Arc::new(CacheRegistry::new());
        let queue = Arc::new(EventQueue::new());
        let cache = EntityCache::new(config.clone(), registry);
        let consumer = Arc::new(InvalidationConsumer::new(config, queue.clone(), cache.clone()));
        let trigger = Arc::new(InvalidationTrigger::new(queue, consumer));

        Self {
            transport,
            cache,
            trigger,
        }
    }

    /// Build a client talking HTTP to the configured base address.
    pub fn from_settings(settings: &Settings) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&settings.api.base_url)?;
        Ok(Self::new(
            Arc::new(transport),
            CacheConfig::from(&settings.cache),
        ))
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn books(&self) -> BooksQuery {
        self.query(QueryKey::AllBooks)
    }

    pub fn book(&self, id: impl Into<String>) -> BookQuery {
        self.query(QueryKey::BookById(id.into()))
    }

    pub fn borrow_summaries(&self) -> BorrowSummariesQuery {
        self.query(QueryKey::BorrowSummaries)
    }

    /// One-shot read of a single book, served from cache when fresh.
    pub async fn resolve_book(&self, id: &str) -> Result<Arc<Book>, TransportError> {
        match self.resolve(QueryKey::BookById(id.to_string())).await? {
            QueryData::Book(book) => Ok(book),
            _ => Err(TransportError::decode("unexpected payload for a single book")),
        }
    }

    pub async fn resolve(&self, key: QueryKey) -> Result<QueryData, TransportError> {
        let tags = key.provides_tags();
        let fetcher = endpoints::fetcher(self.transport.clone(), key.clone());
        self.cache.resolve(key, tags, fetcher).await
    }

    pub fn create_book(&self) -> Mutation<CreateBook> {
        self.mutation()
    }

    pub fn update_book(&self) -> Mutation<UpdateBook> {
        self.mutation()
    }

    pub fn delete_book(&self) -> Mutation<DeleteBook> {
        self.mutation()
    }

    pub fn borrow_book(&self) -> Mutation<BorrowBook> {
        self.mutation()
    }

    /// Invalidate `tags` without a mutation, e.g. a manual refresh.
    pub fn invalidate(&self, tags: TagSet) -> Option<Invalidation> {
        self.trigger.invalidate_tags(tags)
    }

    fn query<T: crate::query::QueryOutput>(&self, key: QueryKey) -> Query<T> {
        let tags = key.provides_tags();
        let fetcher = endpoints::fetcher(self.transport.clone(), key.clone());
        Query::new(self.cache.read(key, tags, fetcher))
    }

    fn mutation<E: MutationEndpoint>(&self) -> Mutation<E> {
        Mutation::new(self.transport.clone(), self.trigger.clone())
    }
}
