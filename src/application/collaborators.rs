//! Interaction points the action flows call out to.
//!
//! How a confirmation is asked or a notification shown is up to the front
//! end; the flows only need the answer.

use async_trait::async_trait;
use tracing::{info, warn};

/// A yes/no question shown before a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub description: String,
    pub confirm_text: &'static str,
    pub cancel_text: &'static str,
}

#[async_trait]
pub trait ConfirmGate: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Answers yes to everything; used for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl ConfirmGate for AutoConfirm {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotifyKind, message: &str);
}

/// Sends notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Success => info!(notification = message, "notify"),
            NotifyKind::Error => warn!(notification = message, "notify"),
        }
    }
}
