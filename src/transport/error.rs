use thiserror::Error;

/// Uniform failure shape for every call that reaches (or tries to reach) the
/// catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request failed with status {status}: {message}")]
pub struct TransportError {
    pub status: u16,
    pub message: String,
}

impl TransportError {
    /// Status used when the server did not provide one.
    pub const DEFAULT_STATUS: u16 = 500;

    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Connection-level failure; no HTTP status was received.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_STATUS, message)
    }

    /// The response arrived but its body could not be interpreted.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_STATUS, message)
    }
}
