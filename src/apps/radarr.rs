use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Result;
use super::starr::StarrClient;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub size_on_disk: u64,
    pub has_file: bool,
    pub is_available: bool,
    pub monitored: bool,
    pub digital_release: Option<DateTime<Utc>>,
    pub physical_release: Option<DateTime<Utc>>,
    pub movie_file: Option<MovieFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieFile {
    #[serde(default)]
    pub id: i64,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
}

/// Records a Radarr instance provides.
#[async_trait]
pub trait RadarrApi: Send + Sync {
    /// Every movie in the library.
    async fn movies(&self) -> Result<Vec<Movie>>;
}

#[async_trait]
impl RadarrApi for StarrClient {
    async fn movies(&self) -> Result<Vec<Movie>> {
        self.get("movie", &[]).await
    }
}
