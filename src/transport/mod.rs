//! Transport layer for the catalog API.
//!
//! Issues HTTP calls relative to the configured base address, unwraps the
//! `{success, message, data}` envelope, and normalizes every failure into a
//! [`TransportError`]. Retries are never performed here.

mod error;
mod http;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

pub use error::TransportError;
pub use http::{HttpTransport, unwrap_envelope};

/// A single call against the catalog service.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base address, e.g. `books/42`.
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }
}

/// Executes requests and returns the unwrapped `data` payload.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, TransportError>;
}
