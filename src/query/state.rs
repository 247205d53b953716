use std::sync::Arc;

use libris_api_types::{Book, BorrowSummary};

use crate::transport::TransportError;

/// Message shown when a failure carries no server-supplied text.
pub const GENERIC_ERROR_MESSAGE: &str = "Unknown error";

/// Lifecycle of a query or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl QueryStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, QueryStatus::Success | QueryStatus::Error)
    }
}

/// Decoded payload of a cached query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Books(Arc<Vec<Book>>),
    Book(Arc<Book>),
    BorrowSummaries(Arc<Vec<BorrowSummary>>),
}

/// What every subscriber of a cache entry observes.
///
/// `data` survives refetches and failures: it always holds the last value
/// that was fetched successfully.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryState {
    pub status: QueryStatus,
    pub data: Option<QueryData>,
    pub error: Option<TransportError>,
}

impl QueryState {
    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    pub fn view(&self) -> ViewState<&QueryData> {
        render(self.status, self.data.as_ref(), self.error.as_ref().map(|e| e.message.as_str()))
    }
}

/// What a view should draw for a given state.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Idle or loading: show a pending indicator.
    Pending,
    /// Show this message.
    Failed(String),
    /// Show the data.
    Ready(T),
}

pub(crate) fn render<T>(status: QueryStatus, data: Option<T>, error: Option<&str>) -> ViewState<T> {
    match status {
        QueryStatus::Idle | QueryStatus::Loading => ViewState::Pending,
        QueryStatus::Error => ViewState::Failed(error_message(error)),
        QueryStatus::Success => match data {
            Some(data) => ViewState::Ready(data),
            None => ViewState::Failed(GENERIC_ERROR_MESSAGE.to_string()),
        },
    }
}

pub(crate) fn error_message(message: Option<&str>) -> String {
    message
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(GENERIC_ERROR_MESSAGE)
        .to_string()
}
