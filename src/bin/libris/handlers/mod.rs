#![deny(clippy::all, clippy::pedantic)]

pub mod books;
pub mod borrow;
pub mod open;
pub mod summary;

use std::sync::Arc;

use libris::application::{ActionOutcome, AppError};
use libris::query::{QuerySnapshot, QueryStatus};
use libris::routes::Navigation;
use libris::transport::TransportError;
use libris_api_types::Book;
use serde::Serialize;

use crate::context::Ctx;
use crate::print::print_json;

/// Navigate to a book route and return what its loader resolved.
pub async fn mount_book(ctx: &Ctx, path: &str) -> Result<Arc<Book>, AppError> {
    match ctx.router.navigate(path).await {
        Navigation::Mounted { data, .. } => data
            .book()
            .cloned()
            .ok_or_else(|| AppError::invalid_input(format!("`{path}` does not load a book"))),
        Navigation::Boundary(err) => Err(err.into()),
    }
}

/// Turn a settled query into its data or the error it settled with.
pub fn settled_data<T>(snapshot: QuerySnapshot<T>) -> Result<T, AppError> {
    let failed = snapshot.status == QueryStatus::Error;
    if let Some(err) = snapshot.error.filter(|_| failed) {
        return Err(err.into());
    }
    snapshot
        .data
        .ok_or_else(|| TransportError::decode("query settled without data").into())
}

pub fn finish<T: Serialize>(outcome: ActionOutcome<T>) -> Result<(), AppError> {
    match outcome {
        ActionOutcome::Completed(value) => print_json(&value),
        ActionOutcome::Cancelled => {
            eprintln!("cancelled");
            Ok(())
        }
    }
}
