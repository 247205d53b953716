use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use libris_api_types::Envelope;

use super::{ApiRequest, Transport, TransportError};

/// reqwest-backed [`Transport`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base: &Url) -> Result<Self, TransportError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| TransportError::network(format!("failed to build client: {err}")))?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("libris/", env!("CARGO_PKG_VERSION"))
    }

    pub fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| TransportError::new(400, format!("invalid request path `{path}`: {err}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.url(&request.path)?;
        let mut req = self.client.request(request.method, url);
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|err| {
            warn!(error = %err, "request did not reach the catalog service");
            TransportError::network(err.to_string())
        })?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| TransportError::network(err.to_string()))?;

        let result = unwrap_envelope(status, &bytes);
        match &result {
            Ok(_) => debug!(status = status.as_u16(), "request succeeded"),
            Err(err) => warn!(status = err.status, message = %err.message, "request failed"),
        }
        result
    }
}

/// Interpret a raw response: non-2xx becomes a [`TransportError`], 2xx yields
/// the envelope's `data` (or `null` when the body carries none).
pub fn unwrap_envelope(status: StatusCode, body: &[u8]) -> Result<Value, TransportError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<Envelope<Value>>(body)
            .ok()
            .map(|env| env.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(TransportError::new(status.as_u16(), message));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    let envelope: Envelope<Value> = serde_json::from_slice(body)
        .map_err(|err| TransportError::decode(format!("failed to parse body: {err}")))?;
    Ok(envelope.data.unwrap_or(Value::Null))
}
