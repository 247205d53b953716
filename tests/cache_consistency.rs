//! End-to-end cache consistency through the public client surface.
//!
//! An in-memory catalog stands in for the service so each test can count
//! exactly which requests the client made.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use libris::LibraryClient;
use libris::application::{
    ActionError, ActionOutcome, AutoConfirm, BookActions, BorrowForm, Notifier, NotifyKind, ValidationError,
};
use libris::cache::{CacheConfig, QueryKey};
use libris::query::QueryStatus;
use libris::routes::{Navigation, Route, Router};
use libris::transport::{ApiRequest, Transport, TransportError};
use libris_api_types::{Book, BookRef, BorrowRequest, BorrowSummary, Genre, NewBook};
use serde_json::{Value, json};
use time::macros::{date, datetime};
use tokio::sync::Notify;

#[derive(Default)]
struct Catalog {
    books: Mutex<Vec<Book>>,
    summaries: Mutex<Vec<BorrowSummary>>,
    calls: Mutex<HashMap<String, usize>>,
    fail_writes: AtomicBool,
}

impl Catalog {
    fn with_books(books: Vec<Book>) -> Arc<Self> {
        let catalog = Self::default();
        *catalog.books.lock().expect("books") = books;
        Arc::new(catalog)
    }

    fn calls(&self, call: &str) -> usize {
        self.calls.lock().expect("calls").get(call).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls").values().sum()
    }

    fn not_found() -> TransportError {
        TransportError::new(404, "Book not found")
    }

    fn handle(&self, request: &ApiRequest) -> Result<Value, TransportError> {
        let segments: Vec<&str> = request.path.split('/').collect();
        let mut books = self.books.lock().expect("books");

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["books"]) => Ok(json!(*books)),
            ("GET", ["books", id]) => books
                .iter()
                .find(|book| book.id == *id)
                .map(|book| json!(book))
                .ok_or_else(Self::not_found),
            ("GET", ["borrow"]) => Ok(json!(*self.summaries.lock().expect("summaries"))),
            (method, _) if method != "GET" && self.fail_writes.load(Ordering::SeqCst) => {
                Err(TransportError::new(500, "Database unavailable"))
            }
            ("POST", ["books"]) => {
                let new: NewBook = serde_json::from_value(body(request))
                    .map_err(|err| TransportError::new(400, err.to_string()))?;
                let book = Book::from_new((books.len() + 1).to_string(), new);
                books.push(book.clone());
                Ok(json!(book))
            }
            ("PUT", ["books", id]) => {
                let update: Book = serde_json::from_value(body(request))
                    .map_err(|err| TransportError::new(400, err.to_string()))?;
                let slot = books
                    .iter_mut()
                    .find(|book| book.id == *id)
                    .ok_or_else(Self::not_found)?;
                *slot = update.clone();
                Ok(json!(update))
            }
            ("DELETE", ["books", id]) => {
                let before = books.len();
                books.retain(|book| book.id != *id);
                if books.len() == before {
                    return Err(Self::not_found());
                }
                Ok(Value::Null)
            }
            ("POST", ["borrow"]) => {
                let borrow: BorrowRequest = serde_json::from_value(body(request))
                    .map_err(|err| TransportError::new(400, err.to_string()))?;
                let book = books
                    .iter_mut()
                    .find(|book| book.id == borrow.book)
                    .ok_or_else(Self::not_found)?;
                book.copies -= borrow.quantity;
                book.available = book.copies > 0;
                self.summaries.lock().expect("summaries").push(BorrowSummary {
                    total_quantity: borrow.quantity,
                    book: BookRef {
                        title: book.title.clone(),
                        isbn: book.isbn.clone(),
                    },
                });
                Ok(json!(borrow))
            }
            _ => Err(TransportError::new(404, "Route not found")),
        }
    }
}

fn body(request: &ApiRequest) -> Value {
    request.body.clone().unwrap_or(Value::Null)
}

#[async_trait]
impl Transport for Catalog {
    async fn execute(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let call = format!("{} {}", request.method, request.path);
        *self.calls.lock().expect("calls").entry(call).or_default() += 1;
        self.handle(&request)
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<(NotifyKind, String)>>);

impl Notifier for Recorder {
    fn notify(&self, kind: NotifyKind, message: &str) {
        self.0.lock().expect("notes").push((kind, message.to_string()));
    }
}

/// Holds each `GET borrow` response until released, after the catalog has
/// already answered it.
struct HeldSummaries {
    catalog: Arc<Catalog>,
    arrived: AtomicUsize,
    release: Notify,
}

impl HeldSummaries {
    fn new(catalog: Arc<Catalog>) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            arrived: AtomicUsize::new(0),
            release: Notify::new(),
        })
    }

    async fn wait_for_arrivals(&self, count: usize) {
        while self.arrived.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for HeldSummaries {
    async fn execute(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let held = request.method.as_str() == "GET" && request.path == "borrow";
        let response = self.catalog.execute(request).await;
        if held {
            self.arrived.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
        }
        response
    }
}

fn dune() -> Book {
    Book {
        id: "1".into(),
        title: "Dune".into(),
        author: "Frank Herbert".into(),
        genre: Genre::Fiction,
        isbn: "9780441013593".into(),
        description: "Spice".into(),
        copies: 2,
        available: true,
    }
}

fn emma() -> NewBook {
    NewBook {
        title: "Emma".into(),
        author: "Jane Austen".into(),
        genre: Genre::Fiction,
        isbn: "9780141439587".into(),
        description: "Matchmaking".into(),
        copies: 1,
        available: true,
    }
}

fn client(catalog: &Arc<Catalog>) -> LibraryClient {
    LibraryClient::new(catalog.clone(), CacheConfig::default())
}

#[tokio::test]
async fn concurrent_reads_share_one_request() {
    let catalog = Catalog::with_books(vec![dune()]);
    let client = client(&catalog);

    let mut first = client.books();
    let mut second = client.books();
    let (a, b) = tokio::join!(first.settled(), second.settled());

    assert_eq!(a.data, b.data);
    assert_eq!(a.data.expect("books").len(), 1);
    assert_eq!(catalog.calls("GET books"), 1);
}

#[tokio::test]
async fn create_refreshes_subscribed_list() {
    let catalog = Catalog::with_books(vec![dune()]);
    let client = client(&catalog);

    let mut list = client.books();
    assert_eq!(list.settled().await.data.expect("books").len(), 1);

    let created = client.create_book().invoke(emma()).await.expect("create");
    assert_eq!(created.id, "2");

    let refreshed = list.settled().await;
    assert_eq!(refreshed.status, QueryStatus::Success);
    assert_eq!(refreshed.data.expect("books").len(), 2);
    assert_eq!(catalog.calls("GET books"), 2);
}

#[tokio::test]
async fn borrow_refreshes_summary_and_book_detail() {
    let catalog = Catalog::with_books(vec![dune()]);
    let client = client(&catalog);

    let mut summaries = client.borrow_summaries();
    let mut detail = client.book("1");
    assert!(summaries.settled().await.data.expect("summaries").is_empty());
    assert_eq!(detail.settled().await.data.expect("book").copies, 2);

    let request = BorrowRequest {
        book: "1".into(),
        quantity: 1,
        due_date: datetime!(2030-01-01 0:00 UTC),
    };
    client.borrow_book().invoke(request).await.expect("borrow");

    let summaries = summaries.settled().await.data.expect("summaries");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_quantity, 1);
    assert_eq!(summaries[0].book.title, "Dune");
    assert_eq!(detail.settled().await.data.expect("book").copies, 1);
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let catalog = Catalog::with_books(vec![dune()]);
    catalog.fail_writes.store(true, Ordering::SeqCst);
    let client = client(&catalog);

    let mut list = client.books();
    list.settled().await;

    let create = client.create_book();
    let err = create.invoke(emma()).await.expect_err("fails");
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "Database unavailable");
    assert_eq!(create.state().status, QueryStatus::Error);

    assert!(!client.cache().is_stale(&QueryKey::AllBooks));
    assert_eq!(list.current().status, QueryStatus::Success);
    assert_eq!(catalog.calls("GET books"), 1);
}

#[tokio::test]
async fn unwatched_list_goes_stale_and_refetches_on_next_read() {
    let catalog = Catalog::with_books(vec![dune()]);
    let client = client(&catalog);

    client.resolve(QueryKey::AllBooks).await.expect("seed");
    client.delete_book().invoke("1".into()).await.expect("delete");

    assert!(client.cache().is_stale(&QueryKey::AllBooks));
    assert_eq!(catalog.calls("GET books"), 1);

    let mut list = client.books();
    assert!(list.settled().await.data.expect("books").is_empty());
    assert_eq!(catalog.calls("GET books"), 2);
}

#[tokio::test]
async fn loader_without_id_fails_before_any_request() {
    let catalog = Catalog::with_books(vec![dune()]);
    let router = Router::new(client(&catalog));

    for path in ["/edit-book", "/borrow/"] {
        match router.navigate(path).await {
            Navigation::Boundary(err) => {
                assert_eq!(err.status, 400);
                assert_eq!(err.message, "Book ID not provided");
            }
            other => panic!("expected boundary for {path}, got {other:?}"),
        }
    }
    assert_eq!(catalog.total_calls(), 0);
}

#[tokio::test]
async fn loader_keeps_upstream_status_for_missing_book() {
    let catalog = Catalog::with_books(vec![dune()]);
    let router = Router::new(client(&catalog));

    match router.navigate("/books/99").await {
        Navigation::Boundary(err) => {
            assert_eq!(err.status, 404);
            assert_eq!(err.message, "Failed to fetch book");
        }
        other => panic!("expected boundary, got {other:?}"),
    }
}

#[tokio::test]
async fn loader_mounts_with_book_and_shares_the_cache() {
    let catalog = Catalog::with_books(vec![dune()]);
    let router = Router::new(client(&catalog));

    match router.navigate("/borrow/1").await {
        Navigation::Mounted { route, data, .. } => {
            assert_eq!(route, Route::BorrowBook);
            assert_eq!(data.book().expect("book").title, "Dune");
        }
        other => panic!("expected mount, got {other:?}"),
    }

    let mut detail = router.client().book("1");
    assert_eq!(detail.settled().await.data.expect("book").id, "1");
    assert_eq!(catalog.calls("GET books/1"), 1);
}

#[tokio::test]
async fn borrow_over_available_copies_is_rejected_locally() {
    let catalog = Catalog::with_books(vec![dune()]);
    let notes = Arc::new(Recorder::default());
    let actions = BookActions::new(client(&catalog), Arc::new(AutoConfirm), notes.clone());

    let form = BorrowForm {
        quantity: 3,
        due_date: Some(date!(2030 - 01 - 01)),
    };
    let err = actions
        .borrow_book(&dune(), &form, date!(2026 - 01 - 01))
        .await
        .expect_err("rejected");

    assert_eq!(
        err,
        ActionError::Validation(ValidationError::QuantityExceedsCopies { copies: 2 })
    );
    assert_eq!(catalog.calls("POST borrow"), 0);
    assert_eq!(
        notes.0.lock().expect("notes").as_slice(),
        &[(
            NotifyKind::Error,
            "Quantity cannot exceed available copies (2)".to_string()
        )]
    );
}

#[tokio::test]
async fn failed_borrow_notifies_with_server_message() {
    let catalog = Catalog::with_books(vec![dune()]);
    catalog.fail_writes.store(true, Ordering::SeqCst);
    let notes = Arc::new(Recorder::default());
    let actions = BookActions::new(client(&catalog), Arc::new(AutoConfirm), notes.clone());

    let form = BorrowForm {
        quantity: 1,
        due_date: Some(date!(2030 - 01 - 01)),
    };
    let err = actions
        .borrow_book(&dune(), &form, date!(2026 - 01 - 01))
        .await
        .expect_err("server failure");

    assert!(matches!(err, ActionError::Mutation(_)));
    let notes = notes.0.lock().expect("notes");
    assert_eq!(
        notes.last().map(|(_, message)| message.as_str()),
        Some("Failed to borrow book: Database unavailable")
    );
}

#[tokio::test]
async fn borrow_action_refreshes_subscribed_summary() {
    let catalog = Catalog::with_books(vec![Book { copies: 5, ..dune() }]);
    let client = client(&catalog);
    let notes = Arc::new(Recorder::default());
    let actions = BookActions::new(client.clone(), Arc::new(AutoConfirm), notes.clone());

    let mut summaries = client.borrow_summaries();
    assert!(summaries.settled().await.data.expect("summaries").is_empty());

    let book = client.resolve_book("1").await.expect("book");
    let form = BorrowForm {
        quantity: 2,
        due_date: Some(date!(2030 - 01 - 01)),
    };
    let outcome = actions
        .borrow_book(&book, &form, date!(2026 - 01 - 01))
        .await
        .expect("borrowed");
    assert!(matches!(outcome, ActionOutcome::Completed(_)));

    let refreshed = summaries.settled().await;
    assert_eq!(refreshed.status, QueryStatus::Success);
    let refreshed = refreshed.data.expect("summaries");
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].total_quantity, 2);
    assert_eq!(catalog.calls("POST borrow"), 1);
    assert_eq!(catalog.calls("GET borrow"), 2);
    assert_eq!(
        notes.0.lock().expect("notes").as_slice(),
        &[(NotifyKind::Success, "Book borrowed successfully!".to_string())]
    );
}

#[tokio::test]
async fn subscriber_after_borrow_sees_fresh_summary_despite_older_fetch() {
    let catalog = Catalog::with_books(vec![dune()]);
    let held = HeldSummaries::new(catalog.clone());
    let client = LibraryClient::new(held.clone(), CacheConfig::default());

    let background = {
        let client = client.clone();
        tokio::spawn(async move { client.resolve(QueryKey::BorrowSummaries).await })
    };
    held.wait_for_arrivals(1).await;

    let request = BorrowRequest {
        book: "1".into(),
        quantity: 1,
        due_date: datetime!(2030-01-01 0:00 UTC),
    };
    client.borrow_book().invoke(request).await.expect("borrow");

    let mut summaries = client.borrow_summaries();
    held.release.notify_one();
    held.wait_for_arrivals(2).await;
    held.release.notify_one();

    let settled = tokio::time::timeout(Duration::from_secs(5), summaries.settled())
        .await
        .expect("summary settles");
    assert_eq!(settled.status, QueryStatus::Success);
    assert_eq!(settled.data.expect("summaries").len(), 1);
    assert!(!client.cache().is_stale(&QueryKey::BorrowSummaries));
    assert_eq!(catalog.calls("GET borrow"), 2);

    background.await.expect("join").expect("resolve");
}
