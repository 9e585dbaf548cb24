use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::http::{HttpClient, join};
use super::{FetchError, Result};

/// Torrent fields requested from `web.update_ui`.
const FIELDS: &[&str] = &[
    "name",
    "state",
    "total_size",
    "total_uploaded",
    "all_time_download",
    "eta",
    "finished_time",
    "is_finished",
    "is_seed",
    "paused",
    "upload_payload_rate",
    "download_payload_rate",
    "message",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DelugeTransfer {
    pub name: String,
    pub state: String,
    pub total_size: u64,
    pub total_uploaded: u64,
    pub all_time_download: u64,
    /// Seconds until done.
    pub eta: f64,
    /// Seconds since the transfer finished.
    pub finished_time: f64,
    pub is_finished: bool,
    pub is_seed: bool,
    pub paused: bool,
    pub upload_payload_rate: f64,
    pub download_payload_rate: f64,
    pub message: String,
}

/// Records a Deluge instance provides.
#[async_trait]
pub trait DelugeApi: Send + Sync {
    async fn transfers(&self) -> Result<Vec<DelugeTransfer>>;
}

#[derive(Debug, Deserialize)]
struct RpcReply<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiUpdate {
    torrents: BTreeMap<String, DelugeTransfer>,
}

/// JSON-RPC client for one Deluge web UI.
#[derive(Debug)]
pub struct DelugeClient {
    http: HttpClient,
    url: String,
    password: String,
    next_id: Mutex<u64>,
}

impl DelugeClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            http,
            url: join(&base_url.into(), "json"),
            password: password.into(),
            next_id: Mutex::new(0),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            *next_id
        };

        let body = json!({ "method": method, "params": params, "id": id });
        let reply: RpcReply<T> = self.http.post_json(&self.url, &body).await?;

        if let Some(error) = reply.error.filter(|e| !e.is_null()) {
            return Err(FetchError::Upstream(format!("{}: {}", method, error)));
        }

        reply
            .result
            .ok_or_else(|| FetchError::Decode(format!("{}: empty result", method)))
    }
}

#[async_trait]
impl DelugeApi for DelugeClient {
    async fn transfers(&self) -> Result<Vec<DelugeTransfer>> {
        let accepted: bool = self.call("auth.login", json!([self.password])).await?;
        if !accepted {
            return Err(FetchError::Auth("deluge rejected the password".to_string()));
        }

        let update: UiUpdate = self.call("web.update_ui", json!([FIELDS, {}])).await?;
        Ok(update.torrents.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_update_decodes() {
        let json = r#"{
            "result": {
                "connected": true,
                "torrents": {
                    "aaa": {"name": "one", "state": "Seeding", "total_size": 10,
                            "eta": 0, "finished_time": 3600.0, "is_finished": true},
                    "bbb": {"name": "two", "state": "Downloading", "eta": 42.0}
                }
            },
            "error": null,
            "id": 2
        }"#;

        let reply: RpcReply<UiUpdate> = serde_json::from_str(json).unwrap();
        assert!(reply.error.unwrap_or(Value::Null).is_null());
        let torrents = reply.result.unwrap().torrents;
        assert_eq!(torrents.len(), 2);
        assert_eq!(torrents["aaa"].finished_time, 3600.0);
        assert_eq!(torrents["bbb"].eta, 42.0);
    }
}
