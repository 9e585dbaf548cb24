use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dashboard::{EventKind, Phase, Queued};
use crate::observability::MetricsSnapshot;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

/// Body of `GET /status`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: Phase,
    /// Instances with a URL configured.
    pub instances: usize,
    pub metrics: MetricsSnapshot,
    /// When the last snapshot was saved, if any.
    pub last_cycle: Option<DateTime<Utc>>,
}

/// Body of `POST /trigger/dashboard`
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: Queued,
    pub event: EventKind,
}
