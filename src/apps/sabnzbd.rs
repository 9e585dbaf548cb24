//! SABnzbd queue and history
//!
//! Sizes (`"701.3 MB"`) and ETAs (`"13:42 Sun 17 Oct"`) are kept as the raw
//! strings SABnzbd sends; the dashboard decodes them with
//! [`crate::decode`] so a malformed value fails that instance's state.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::http::{HttpClient, join};
use super::Result;
use crate::decode::float_string;

/// A queue entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SabQueueSlot {
    pub index: i64,
    pub nzo_id: String,
    pub status: String,
    pub filename: String,
    pub cat: String,
    pub priority: String,
    #[serde(deserialize_with = "float_string")]
    pub mb: f64,
    #[serde(deserialize_with = "float_string")]
    pub mbleft: f64,
    #[serde(deserialize_with = "float_string")]
    pub mbmissing: f64,
    #[serde(deserialize_with = "float_string")]
    pub percentage: f64,
    pub size: String,
    pub sizeleft: String,
    pub timeleft: String,
    pub eta: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SabQueue {
    pub version: String,
    pub status: String,
    pub paused: bool,
    pub speed: String,
    pub size: String,
    pub sizeleft: String,
    pub noofslots: u64,
    pub slots: Vec<SabQueueSlot>,
}

/// A finished (or failed) download.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SabHistorySlot {
    pub id: i64,
    pub nzo_id: String,
    pub name: String,
    pub nzb_name: String,
    pub category: String,
    pub status: String,
    /// Unix seconds.
    pub completed: i64,
    pub bytes: u64,
    pub size: String,
    pub download_time: i64,
    pub postproc_time: i64,
    pub fail_message: String,
    pub storage: String,
    /// Free-form; its shape differs between SABnzbd versions.
    pub completeness: Value,
    /// Free-form; its shape differs between SABnzbd versions.
    pub meta: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SabHistory {
    pub total_size: String,
    pub month_size: String,
    pub week_size: String,
    pub day_size: String,
    pub noofslots: u64,
    pub last_history_update: i64,
    pub version: String,
    pub slots: Vec<SabHistorySlot>,
}

/// Records a SABnzbd instance provides.
#[async_trait]
pub trait SabnzbdApi: Send + Sync {
    async fn queue(&self) -> Result<SabQueue>;
    async fn history(&self) -> Result<SabHistory>;
}

#[derive(Deserialize)]
struct QueueReply {
    queue: SabQueue,
}

#[derive(Deserialize)]
struct HistoryReply {
    history: SabHistory,
}

/// HTTP client for one SABnzbd instance.
#[derive(Debug, Clone)]
pub struct SabnzbdClient {
    http: HttpClient,
    api_url: String,
    api_key: String,
}

impl SabnzbdClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_url: join(&base_url.into(), "api"),
            api_key: api_key.into(),
        }
    }

    async fn mode<T: serde::de::DeserializeOwned>(&self, mode: &str) -> Result<T> {
        let query = [
            ("output", "json".to_string()),
            ("mode", mode.to_string()),
            ("apikey", self.api_key.clone()),
        ];

        self.http.get_json(&self.api_url, &query, &[]).await
    }
}

#[async_trait]
impl SabnzbdApi for SabnzbdClient {
    async fn queue(&self) -> Result<SabQueue> {
        let reply: QueueReply = self.mode("queue").await?;
        Ok(reply.queue)
    }

    async fn history(&self) -> Result<SabHistory> {
        let reply: HistoryReply = self.mode("history").await?;
        Ok(reply.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_slot_decodes_string_numbers() {
        let json = r#"{
            "index": 1,
            "nzo_id": "SABnzbd_nzo_xnfbbdbh",
            "filename": "Rick Astley - Never Gonna Give You Up (1987)",
            "mbleft": "593.67",
            "mb": "701.34",
            "size": "701.3 MB",
            "sizeleft": "593.7 MB",
            "percentage": "15",
            "mbmissing": "0.00",
            "status": "Downloading",
            "timeleft": "0:03:57",
            "eta": "13:42 Sun 17 Oct",
            "labels": []
        }"#;

        let slot: SabQueueSlot = serde_json::from_str(json).unwrap();
        assert!((slot.mbleft - 593.67).abs() < 1e-9);
        assert_eq!(slot.percentage, 15.0);
        assert_eq!(slot.size, "701.3 MB");
        assert_eq!(slot.eta, "13:42 Sun 17 Oct");
    }

    #[test]
    fn test_history_keeps_free_form_fields() {
        let json = r#"{
            "history": {
                "total_size": "1.2 T",
                "month_size": "80.5 G",
                "week_size": "12 G",
                "noofslots": 1,
                "slots": [{
                    "name": "thing", "completed": 1700000000, "fail_message": "",
                    "completeness": null, "meta": {"rating": [1, 2]}
                }]
            }
        }"#;

        let reply: HistoryReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.history.total_size, "1.2 T");
        assert_eq!(reply.history.slots[0].meta["rating"][1], 2);
        assert!(reply.history.slots[0].completeness.is_null());
    }
}
