//! Collector transport.
//!
//! The client only needs "POST this JSON, give me the body back"; the
//! [`Transport`] trait keeps that seam open so tests can substitute an
//! in-memory collector.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Errors surfaced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, or body read failure.
    #[error("collector request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The collector answered with a non-2xx status.
    #[error("collector answered {status}: {body}")]
    Status { status: u16, body: String },

    /// Any other transport specific failure.
    #[error("collector transport error: {0}")]
    Other(String),
}

/// Sends one serialized message to the collector.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// POST `body` as JSON to `url`, returning the response body.
    async fn post_json(&self, url: &str, body: String) -> Result<String, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`.
///
/// No timeout or retry is configured here; reqwest defaults apply.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    debug: bool,
}

impl HttpTransport {
    pub fn new(debug: bool) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, debug })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<String, TransportError> {
        if self.debug {
            tracing::debug!(url = %url, payload = %body, "Posting message to collector");
        }

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if self.debug {
            tracing::debug!(url = %url, status = %status, response = %text, "Collector responded");
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}
