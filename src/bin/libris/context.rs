#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use libris::LibraryClient;
use libris::application::{AppError, AutoConfirm, BookActions, ConfirmGate};
use libris::config::Settings;
use libris::routes::Router;

use crate::prompt::{StderrNotifier, StdinConfirm};

pub struct Ctx {
    pub router: Router,
    pub actions: BookActions,
}

impl Ctx {
    pub fn new(client: LibraryClient, confirm: Arc<dyn ConfirmGate>) -> Self {
        let actions = BookActions::new(client.clone(), confirm, Arc::new(StderrNotifier));
        Self {
            router: Router::new(client),
            actions,
        }
    }

    /// `assume_yes` skips the interactive confirmation prompts.
    pub fn from_settings(settings: &Settings, assume_yes: bool) -> Result<Self, AppError> {
        let client = LibraryClient::from_settings(settings)?;
        let confirm: Arc<dyn ConfirmGate> = if assume_yes {
            Arc::new(AutoConfirm)
        } else {
            Arc::new(StdinConfirm)
        };
        Ok(Self::new(client, confirm))
    }

    pub fn client(&self) -> &LibraryClient {
        self.router.client()
    }
}
