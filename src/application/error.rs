use thiserror::Error;

use crate::{
    config::LoadError, infra::error::InfraError, routes::RouteResolutionError,
    transport::TransportError,
};

use super::actions::ActionError;

/// Top-level error surfaced at the binary boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Route(#[from] RouteResolutionError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// HTTP-style status describing the failure, where one applies.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Transport(err) => Some(err.status),
            AppError::Route(err) => Some(err.status),
            AppError::Action(ActionError::Mutation(err)) => Some(err.status()),
            AppError::Action(ActionError::Validation(_)) | AppError::InvalidInput(_) => Some(400),
            AppError::Config(_) | AppError::Infra(_) => None,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::InvalidInput(_) => 2,
            AppError::Action(ActionError::Validation(_)) => 3,
            AppError::Transport(_) | AppError::Route(_) | AppError::Action(_) => 4,
            AppError::Infra(_) => 1,
        }
    }
}
