//! User-facing write flows: validate, confirm, run the mutation, notify.

use std::sync::Arc;

use libris_api_types::{Book, BorrowRecord};
use thiserror::Error;
use time::Date;
use tracing::{debug, instrument};

use crate::client::LibraryClient;
use crate::query::MutationError;

use super::collaborators::{ConfirmGate, ConfirmPrompt, Notifier, NotifyKind};
use super::validation::{BookForm, BorrowForm, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    Completed(T),
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
}

impl<T> ActionOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            ActionOutcome::Completed(value) => Some(value),
            ActionOutcome::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
}

pub type ActionResult<T> = Result<ActionOutcome<T>, ActionError>;

/// Write flows bound to one client and one pair of collaborators.
#[derive(Clone)]
pub struct BookActions {
    client: LibraryClient,
    confirm: Arc<dyn ConfirmGate>,
    notifier: Arc<dyn Notifier>,
}

impl BookActions {
    pub fn new(
        client: LibraryClient,
        confirm: Arc<dyn ConfirmGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            confirm,
            notifier,
        }
    }

    pub fn client(&self) -> &LibraryClient {
        &self.client
    }

    /// Create a book. Creating asks for no confirmation.
    #[instrument(skip_all)]
    pub async fn create_book(&self, form: &BookForm) -> ActionResult<Book> {
        let book = self.validated(form.validate())?;

        match self.client.create_book().invoke(book).await {
            Ok(created) => {
                self.notifier
                    .notify(NotifyKind::Success, "Book added successfully!");
                Ok(ActionOutcome::Completed(created))
            }
            Err(err) => {
                self.notifier.notify(NotifyKind::Error, "Failed to add book!");
                Err(err.into())
            }
        }
    }

    /// Replace `id` with the form contents after confirmation.
    #[instrument(skip(self, form))]
    pub async fn update_book(&self, id: &str, form: &BookForm) -> ActionResult<Book> {
        let book = self.validated(form.validate_update(id))?;

        let prompt = ConfirmPrompt {
            title: "Update Book",
            description: format!("Are you sure you want to update \"{}\"?", book.title),
            confirm_text: "Yes",
            cancel_text: "No",
        };
        if !self.confirmed(&prompt).await {
            return Ok(ActionOutcome::Cancelled);
        }

        match self.client.update_book().invoke(book).await {
            Ok(updated) => {
                self.notifier
                    .notify(NotifyKind::Success, "Book updated successfully!");
                Ok(ActionOutcome::Completed(updated))
            }
            Err(err) => {
                self.notifier
                    .notify(NotifyKind::Error, "Failed to update book");
                Err(err.into())
            }
        }
    }

    /// Delete a book after confirmation. `title` is only used in the prompt.
    #[instrument(skip(self))]
    pub async fn delete_book(&self, id: &str, title: &str) -> ActionResult<()> {
        let prompt = ConfirmPrompt {
            title: "Delete Book",
            description: format!(
                "Are you sure you want to delete \"{title}\"? This action is permanent."
            ),
            confirm_text: "Yes",
            cancel_text: "No",
        };
        if !self.confirmed(&prompt).await {
            return Ok(ActionOutcome::Cancelled);
        }

        match self.client.delete_book().invoke(id.to_string()).await {
            Ok(()) => {
                self.notifier.notify(NotifyKind::Success, "Book Deleted!");
                Ok(ActionOutcome::Completed(()))
            }
            Err(err) => {
                self.notifier
                    .notify(NotifyKind::Error, "Failed to delete book!");
                Err(err.into())
            }
        }
    }

    /// Borrow copies of a loaded book. `today` is the current UTC day.
    #[instrument(skip(self, book, form), fields(book_id = %book.id))]
    pub async fn borrow_book(
        &self,
        book: &Book,
        form: &BorrowForm,
        today: Date,
    ) -> ActionResult<BorrowRecord> {
        let request = self.validated(form.validate(book, today))?;

        let prompt = ConfirmPrompt {
            title: "Borrow Book",
            description: format!(
                "Are you sure you want to borrow {} copy(ies) of \"{}\"?",
                request.quantity, book.title
            ),
            confirm_text: "Borrow",
            cancel_text: "Cancel",
        };
        if !self.confirmed(&prompt).await {
            return Ok(ActionOutcome::Cancelled);
        }

        match self.client.borrow_book().invoke(request).await {
            Ok(record) => {
                self.notifier
                    .notify(NotifyKind::Success, "Book borrowed successfully!");
                Ok(ActionOutcome::Completed(record))
            }
            Err(err) => {
                let message = format!("Failed to borrow book: {}", err.message());
                self.notifier.notify(NotifyKind::Error, &message);
                Err(err.into())
            }
        }
    }

    fn validated<T>(&self, result: Result<T, ValidationError>) -> Result<T, ActionError> {
        result.map_err(|err| {
            self.notifier.notify(NotifyKind::Error, &err.to_string());
            ActionError::Validation(err)
        })
    }

    async fn confirmed(&self, prompt: &ConfirmPrompt) -> bool {
        let confirmed = self.confirm.confirm(prompt).await;
        if !confirmed {
            debug!(prompt = prompt.title, "action cancelled by user");
        }
        confirmed
    }
}
