//! Typed query handles over cache subscriptions.

use std::marker::PhantomData;
use std::sync::Arc;

use libris_api_types::{Book, BorrowSummary};

use crate::cache::{QueryKey, Subscription, Unsubscribe};
use crate::transport::TransportError;

use super::state::{QueryData, QueryState, QueryStatus, ViewState, render};

/// Payload type a query handle projects out of [`QueryData`].
pub trait QueryOutput: Clone + Send + Sync + 'static {
    fn from_data(data: &QueryData) -> Option<Self>;
}

impl QueryOutput for Arc<Vec<Book>> {
    fn from_data(data: &QueryData) -> Option<Self> {
        match data {
            QueryData::Books(books) => Some(books.clone()),
            _ => None,
        }
    }
}

impl QueryOutput for Arc<Book> {
    fn from_data(data: &QueryData) -> Option<Self> {
        match data {
            QueryData::Book(book) => Some(book.clone()),
            _ => None,
        }
    }
}

impl QueryOutput for Arc<Vec<BorrowSummary>> {
    fn from_data(data: &QueryData) -> Option<Self> {
        match data {
            QueryData::BorrowSummaries(list) => Some(list.clone()),
            _ => None,
        }
    }
}

/// Typed copy of a [`QueryState`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<TransportError>,
}

impl<T: QueryOutput> QuerySnapshot<T> {
    pub fn from_state(state: &QueryState) -> Self {
        Self {
            status: state.status,
            data: state.data.as_ref().and_then(T::from_data),
            error: state.error.clone(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    pub fn view(&self) -> ViewState<&T> {
        render(
            self.status,
            self.data.as_ref(),
            self.error.as_ref().map(|e| e.message.as_str()),
        )
    }
}

/// A live, typed subscription to one cached query.
pub struct Query<T> {
    subscription: Subscription,
    _output: PhantomData<fn() -> T>,
}

pub type BooksQuery = Query<Arc<Vec<Book>>>;
pub type BookQuery = Query<Arc<Book>>;
pub type BorrowSummariesQuery = Query<Arc<Vec<BorrowSummary>>>;

impl<T: QueryOutput> Query<T> {
    pub(crate) fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            _output: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        self.subscription.key()
    }

    pub fn current(&self) -> QuerySnapshot<T> {
        QuerySnapshot::from_state(&self.subscription.current())
    }

    pub async fn changed(&mut self) -> QuerySnapshot<T> {
        QuerySnapshot::from_state(&self.subscription.changed().await)
    }

    pub async fn settled(&mut self) -> QuerySnapshot<T> {
        QuerySnapshot::from_state(&self.subscription.settled().await)
    }

    pub fn refetch(&self) -> bool {
        self.subscription.refetch()
    }

    /// Observe every change through a callback until the handle is dropped.
    pub fn on_change<F>(self, mut listener: F) -> Unsubscribe
    where
        F: FnMut(&QuerySnapshot<T>) + Send + 'static,
    {
        self.subscription
            .on_change(move |state| listener(&QuerySnapshot::from_state(state)))
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("subscription", &self.subscription)
            .finish()
    }
}
