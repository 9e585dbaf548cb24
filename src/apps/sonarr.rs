use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Result;
use super::starr::{HistoryRecord, StarrClient};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    pub id: i64,
    pub title: String,
    pub monitored: bool,
    pub next_airing: Option<DateTime<Utc>>,
    pub statistics: Option<SeriesStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesStatistics {
    pub episode_file_count: u64,
    pub episode_count: u64,
    pub total_episode_count: u64,
    pub size_on_disk: u64,
    pub percent_of_episodes: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Episode {
    pub id: i64,
    pub series_id: i64,
    pub title: String,
    pub season_number: i64,
    pub episode_number: i64,
    pub air_date_utc: Option<DateTime<Utc>>,
    pub has_file: bool,
    pub monitored: bool,
}

/// Records a Sonarr instance provides.
#[async_trait]
pub trait SonarrApi: Send + Sync {
    async fn all_series(&self) -> Result<Vec<Series>>;
    async fn series_by_id(&self, id: i64) -> Result<Series>;
    async fn series_episodes(&self, series_id: i64) -> Result<Vec<Episode>>;
    /// Most recent `records` history events, newest first.
    async fn history(&self, records: usize) -> Result<Vec<HistoryRecord>>;
}

#[async_trait]
impl SonarrApi for StarrClient {
    async fn all_series(&self) -> Result<Vec<Series>> {
        self.get("series", &[]).await
    }

    async fn series_by_id(&self, id: i64) -> Result<Series> {
        self.get(&format!("series/{}", id), &[]).await
    }

    async fn series_episodes(&self, series_id: i64) -> Result<Vec<Episode>> {
        self.get("episode", &[("seriesId", series_id.to_string())]).await
    }

    async fn history(&self, records: usize) -> Result<Vec<HistoryRecord>> {
        self.history_page(records).await
    }
}
