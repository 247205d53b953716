//! Route data loaders.
//!
//! A loader runs before its route mounts and hands the view fully resolved
//! data. Loader failures never reach the view; the router turns them into a
//! boundary keyed by status.

use std::sync::Arc;

use libris_api_types::Book;
use tracing::{debug, warn};

use crate::client::LibraryClient;

use super::{Route, RouteParams, RouteResolutionError};

/// Data a loader resolved for its route.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderData {
    /// The route has no loader.
    None,
    Book(Arc<Book>),
}

impl LoaderData {
    pub fn book(&self) -> Option<&Arc<Book>> {
        match self {
            LoaderData::Book(book) => Some(book),
            LoaderData::None => None,
        }
    }
}

/// Run the loader for `route`, if it has one.
pub async fn load(
    client: &LibraryClient,
    route: Route,
    params: &RouteParams,
) -> Result<LoaderData, RouteResolutionError> {
    match route {
        Route::BookDetail | Route::EditBook | Route::BorrowBook => {
            load_book(client, params).await.map(LoaderData::Book)
        }
        Route::AllBooks | Route::CreateBook | Route::BorrowSummary => Ok(LoaderData::None),
    }
}

/// Resolve the book named by the `id` parameter.
///
/// A missing or blank id fails with 400 before any request is made.
pub async fn load_book(
    client: &LibraryClient,
    params: &RouteParams,
) -> Result<Arc<Book>, RouteResolutionError> {
    let Some(id) = params.id() else {
        debug!("book loader called without an id");
        return Err(RouteResolutionError::bad_request("Book ID not provided"));
    };

    client.resolve_book(id).await.map_err(|err| {
        warn!(book_id = id, status = err.status, error = %err, "book loader failed");
        RouteResolutionError::fetch_failed(&err)
    })
}
