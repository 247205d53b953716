//! Route table and navigation.
//!
//! `navigate` matches a path, runs the route's loader, and either mounts the
//! route with resolved data or returns a boundary carrying the failure status.

mod loader;

use std::fmt;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::client::LibraryClient;
use crate::transport::TransportError;

pub use loader::{LoaderData, load, load_book};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/` and `/books`
    AllBooks,
    /// `/create-book`
    CreateBook,
    /// `/books/:id`
    BookDetail,
    /// `/edit-book/:id`
    EditBook,
    /// `/borrow/:id`
    BorrowBook,
    /// `/borrow-summary`
    BorrowSummary,
}

impl Route {
    pub fn pattern(self) -> &'static str {
        match self {
            Route::AllBooks => "/books",
            Route::CreateBook => "/create-book",
            Route::BookDetail => "/books/:id",
            Route::EditBook => "/edit-book/:id",
            Route::BorrowBook => "/borrow/:id",
            Route::BorrowSummary => "/borrow-summary",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub id: Option<String>,
}

impl RouteParams {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }

    /// The `id` parameter, if present and not blank.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: Route,
    pub params: RouteParams,
}

/// Why a navigation ended at an error boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct RouteResolutionError {
    pub status: u16,
    pub message: String,
}

impl RouteResolutionError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(404, format!("No route matches `{path}`"))
    }

    /// Loader fetch failure; keeps the upstream status.
    pub fn fetch_failed(err: &TransportError) -> Self {
        Self::new(err.status, "Failed to fetch book")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Mounted {
        route: Route,
        params: RouteParams,
        data: LoaderData,
    },
    Boundary(RouteResolutionError),
}

pub struct Router {
    client: LibraryClient,
}

impl Router {
    pub fn new(client: LibraryClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &LibraryClient {
        &self.client
    }

    /// Match a path against the route table. Query strings and fragments are
    /// ignored.
    pub fn match_path(path: &str) -> Option<RouteMatch> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (route, id) = match segments.as_slice() {
            [] | ["books"] => (Route::AllBooks, None),
            ["create-book"] => (Route::CreateBook, None),
            ["borrow-summary"] => (Route::BorrowSummary, None),
            ["books", id] => (Route::BookDetail, Some(*id)),
            // Reachable without an id so the loader can reject it.
            ["edit-book"] => (Route::EditBook, None),
            ["edit-book", id] => (Route::EditBook, Some(*id)),
            ["borrow"] => (Route::BorrowBook, None),
            ["borrow", id] => (Route::BorrowBook, Some(*id)),
            _ => return None,
        };

        Some(RouteMatch {
            route,
            params: RouteParams {
                id: id.map(str::to_string),
            },
        })
    }

    #[instrument(skip(self))]
    pub async fn navigate(&self, path: &str) -> Navigation {
        let Some(RouteMatch { route, params }) = Self::match_path(path) else {
            warn!("no route matched");
            return Navigation::Boundary(RouteResolutionError::not_found(path));
        };

        match load(&self.client, route, &params).await {
            Ok(data) => {
                info!(route = %route, "route mounted");
                Navigation::Mounted {
                    route,
                    params,
                    data,
                }
            }
            Err(err) => {
                warn!(route = %route, status = err.status, "route loader failed");
                Navigation::Boundary(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(path: &str) -> Option<(Route, Option<String>)> {
        Router::match_path(path).map(|m| (m.route, m.params.id))
    }

    #[test]
    fn root_and_books_list_all_books() {
        assert_eq!(matched("/"), Some((Route::AllBooks, None)));
        assert_eq!(matched(""), Some((Route::AllBooks, None)));
        assert_eq!(matched("/books"), Some((Route::AllBooks, None)));
        assert_eq!(matched("/books/"), Some((Route::AllBooks, None)));
    }

    #[test]
    fn parameterized_routes_capture_id() {
        assert_eq!(matched("/books/42"), Some((Route::BookDetail, Some("42".into()))));
        assert_eq!(matched("/edit-book/42"), Some((Route::EditBook, Some("42".into()))));
        assert_eq!(matched("/borrow/42?from=list"), Some((Route::BorrowBook, Some("42".into()))));
    }

    #[test]
    fn static_routes() {
        assert_eq!(matched("/create-book"), Some((Route::CreateBook, None)));
        assert_eq!(matched("/borrow-summary"), Some((Route::BorrowSummary, None)));
    }

    #[test]
    fn loader_routes_without_id_match_with_empty_params() {
        assert_eq!(matched("/edit-book"), Some((Route::EditBook, None)));
        assert_eq!(matched("/borrow/"), Some((Route::BorrowBook, None)));
    }

    #[test]
    fn unknown_paths_do_not_match() {
        assert_eq!(matched("/authors"), None);
        assert_eq!(matched("/books/1/extra"), None);
    }

    #[test]
    fn blank_id_param_is_missing() {
        assert_eq!(RouteParams::with_id("  ").id(), None);
        assert_eq!(RouteParams::with_id("7").id(), Some("7"));
    }

    #[test]
    fn fetch_failure_keeps_upstream_status() {
        let err = RouteResolutionError::fetch_failed(&TransportError::new(404, "Book not found"));
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Failed to fetch book");
    }
}
