//! Outbound delivery of dashboard snapshots
//!
//! [`HttpTransport`] posts each snapshot to the collector website.
//! [`MemoryTransport`] keeps them in memory and is what tests use.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::dashboard::{EventKind, Snapshot};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("encoding payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("sending payload: {0}")]
    Send(String),

    #[error("collector replied HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport not configured")]
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Hands a finished snapshot to whatever sits downstream.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `snapshot` on `route`, returning the reply body.
    async fn send(&self, route: &str, event: EventKind, snapshot: &Snapshot) -> Result<String>;
}

/// POSTs snapshots as JSON to `{base_url}/api/v1/notification/{route}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(TransportError::NotConfigured);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dashstate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Send(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}/api/v1/notification/{}", self.base_url, route)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, route: &str, event: EventKind, snapshot: &Snapshot) -> Result<String> {
        let body = serde_json::to_vec(snapshot)?;

        let response = self
            .client
            .post(self.url(route))
            .query(&[("event", event.as_str())])
            .header("X-API-Key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

/// One payload captured by [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct Sent {
    pub route: String,
    pub event: EventKind,
    pub payload: Value,
}

/// Records snapshots instead of sending them.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Sent>>,
    failing: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that rejects every send after recording it.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, route: &str, event: EventKind, snapshot: &Snapshot) -> Result<String> {
        let payload = serde_json::to_value(snapshot)?;
        tracing::debug!(route, event = %event, "Memory send");

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(Sent {
                route: route.to_string(),
                event,
                payload,
            });
        }

        if self.failing {
            return Err(TransportError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        Ok(String::new())
    }
}
