// File: rusty-forms-client/src/transport/http.rs
// Purpose: reqwest-backed transport posting urlencoded form bodies

use super::{encode_form_body, Transport};
use crate::error::TransportError;
use crate::Payload;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Posts payloads over HTTP
///
/// A non-2xx answer becomes a [`TransportError`] whose `status_text` is the
/// canonical reason phrase of the status code (`"Internal Server Error"`
/// for 500), not the phrase the server put on the status line. Codes without
/// a registered phrase report `"error"`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (shared pool, custom timeouts, ...)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, payload: &Payload) -> Result<String, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(encode_form_body(payload))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Request to {} failed: {}", url, e);
                TransportError::network()
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        response.text().await.map_err(|e| {
            tracing::warn!("Failed to read response from {}: {}", url, e);
            TransportError::network()
        })
    }
}

fn status_error(status: StatusCode) -> TransportError {
    TransportError::new(status.as_u16(), status.canonical_reason().unwrap_or("error"))
}
