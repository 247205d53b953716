//! Application services: form validation and the write flows that tie the
//! client to user confirmation and notifications.

pub mod actions;
pub mod collaborators;
pub mod error;
pub mod validation;

pub use actions::{ActionError, ActionOutcome, ActionResult, BookActions};
pub use collaborators::{
    AutoConfirm, ConfirmGate, ConfirmPrompt, LogNotifier, Notifier, NotifyKind,
};
pub use error::AppError;
pub use validation::{BookForm, BorrowForm, ValidationError};
