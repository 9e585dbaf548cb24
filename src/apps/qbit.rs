use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::http::{HttpClient, join};
use super::{FetchError, Result};

/// qBittorrent reports this ETA for transfers that will never finish.
pub const ETA_INFINITY: i64 = 8_640_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QbitTransfer {
    pub hash: String,
    pub name: String,
    pub size: i64,
    pub uploaded: i64,
    pub downloaded: i64,
    pub eta: i64,
    pub amount_left: i64,
    pub completion_on: i64,
    pub progress: f64,
    pub state: String,
}

/// Records a qBittorrent instance provides.
#[async_trait]
pub trait QbitApi: Send + Sync {
    async fn transfers(&self) -> Result<Vec<QbitTransfer>>;
}

/// HTTP client for one qBittorrent instance.
#[derive(Debug)]
pub struct QbitClient {
    http: HttpClient,
    base_url: String,
    username: String,
    password: String,
    logged_in: Mutex<bool>,
}

impl QbitClient {
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            logged_in: Mutex::new(false),
        }
    }

    async fn login(&self) -> Result<()> {
        let url = join(&self.base_url, "api/v2/auth/login");
        let reply = self
            .http
            .post_form(
                &url,
                &[("username", self.username.as_str()), ("password", self.password.as_str())],
            )
            .await?;

        if &reply[..] != b"Ok." {
            return Err(FetchError::Auth(String::from_utf8_lossy(&reply).into_owned()));
        }

        debug!(url = %self.base_url, "qBittorrent login accepted");
        Ok(())
    }

    async fn torrents(&self) -> Result<Vec<QbitTransfer>> {
        let url = join(&self.base_url, "api/v2/torrents/info");
        self.http.get_json(&url, &[], &[]).await
    }
}

#[async_trait]
impl QbitApi for QbitClient {
    async fn transfers(&self) -> Result<Vec<QbitTransfer>> {
        let mut logged_in = self.logged_in.lock().await;
        if !*logged_in {
            self.login().await?;
            *logged_in = true;
        }

        match self.torrents().await {
            // The session cookie expired; log in once more.
            Err(FetchError::Status { status: 403, .. }) => {
                self.login().await?;
                self.torrents().await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_decodes() {
        let json = r#"[{
            "hash": "abc", "name": "linux.iso", "size": 100, "uploaded": 5,
            "downloaded": 60, "eta": 120, "amount_left": 40,
            "completion_on": -1, "progress": 0.6, "state": "downloading",
            "ratio": 0.1
        }]"#;

        let transfers: Vec<QbitTransfer> = serde_json::from_str(json).unwrap();
        assert_eq!(transfers[0].amount_left, 40);
        assert_eq!(transfers[0].completion_on, -1);
        assert_eq!(transfers[0].state, "downloading");
    }
}
