//! Mutation handles.
//!
//! A [`Mutation`] runs one write endpoint. Its state is local to the handle:
//! two handles for the same endpoint do not share status. On success the
//! endpoint's tags are invalidated before `invoke` returns, so anything read
//! afterwards reflects the write.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::cache::{InvalidationTrigger, MutationKind};
use crate::transport::{ApiRequest, Transport, TransportError};

use super::state::{QueryStatus, ViewState, error_message, render};

/// One write operation against the catalog service.
pub trait MutationEndpoint: Send + Sync + 'static {
    type Input: Send;
    type Output: Clone + Send + Sync + 'static;

    const KIND: MutationKind;

    fn request(input: &Self::Input) -> Result<ApiRequest, MutationError>;

    fn decode(data: Value) -> Result<Self::Output, MutationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("could not build {mutation} request: {reason}")]
    Encode {
        mutation: MutationKind,
        reason: String,
    },
    #[error("unexpected {mutation} response: {reason}")]
    Decode {
        mutation: MutationKind,
        reason: String,
    },
}

impl MutationError {
    pub fn encode(mutation: MutationKind, reason: impl ToString) -> Self {
        Self::Encode {
            mutation,
            reason: reason.to_string(),
        }
    }

    pub fn decode(mutation: MutationKind, reason: impl ToString) -> Self {
        Self::Decode {
            mutation,
            reason: reason.to_string(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            MutationError::Transport(err) => err.status,
            MutationError::Encode { .. } => 400,
            MutationError::Decode { .. } => TransportError::DEFAULT_STATUS,
        }
    }

    /// Text suitable for an inline error or notification.
    pub fn message(&self) -> String {
        match self {
            MutationError::Transport(err) => error_message(Some(err.message.as_str())),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationState<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<MutationError>,
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T> MutationState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn view(&self) -> ViewState<&T> {
        let message = self.error.as_ref().map(MutationError::message);
        render(self.status, self.data.as_ref(), message.as_deref())
    }
}

pub struct Mutation<E: MutationEndpoint> {
    transport: Arc<dyn Transport>,
    trigger: Arc<InvalidationTrigger>,
    state: watch::Sender<MutationState<E::Output>>,
}

impl<E: MutationEndpoint> Mutation<E> {
    pub(crate) fn new(transport: Arc<dyn Transport>, trigger: Arc<InvalidationTrigger>) -> Self {
        let (state, _) = watch::channel(MutationState::default());
        Self {
            transport,
            trigger,
            state,
        }
    }

    pub fn state(&self) -> MutationState<E::Output> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<E::Output>> {
        self.state.subscribe()
    }

    /// Run the write and return its result.
    ///
    /// A failed request leaves the cache untouched.
    #[instrument(skip(self, input), fields(mutation = %E::KIND))]
    pub async fn invoke(&self, input: E::Input) -> Result<E::Output, MutationError> {
        self.state.send_modify(|state| {
            state.status = QueryStatus::Loading;
            state.error = None;
        });

        let result = self.execute(input).await;

        match &result {
            Ok(output) => {
                info!("Mutation succeeded");
                self.state.send_modify(|state| {
                    state.status = QueryStatus::Success;
                    state.data = Some(output.clone());
                });
            }
            Err(err) => {
                warn!(status = err.status(), error = %err, "Mutation failed");
                self.state.send_modify(|state| {
                    state.status = QueryStatus::Error;
                    state.error = Some(err.clone());
                });
            }
        }
        result
    }

    /// Forget the last result.
    pub fn reset(&self) {
        self.state.send_replace(MutationState::default());
    }

    async fn execute(&self, input: E::Input) -> Result<E::Output, MutationError> {
        let request = E::request(&input)?;
        let data = self.transport.execute(request).await?;

        // The server accepted the write; invalidate even if the echo fails to decode.
        self.trigger.mutation_succeeded(E::KIND);
        E::decode(data)
    }
}
