use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Result;
use super::starr::{HistoryRecord, StarrClient};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
    pub monitored: bool,
    pub release_date: Option<DateTime<Utc>>,
    pub statistics: Option<AlbumStatistics>,
    pub artist: Option<Artist>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlbumStatistics {
    pub track_file_count: u64,
    pub track_count: u64,
    pub total_track_count: u64,
    pub size_on_disk: u64,
    pub percent_of_tracks: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Artist {
    pub id: i64,
    pub artist_name: String,
}

impl Album {
    pub fn artist_name(&self) -> &str {
        self.artist.as_ref().map(|a| a.artist_name.as_str()).unwrap_or_default()
    }
}

/// Records a Lidarr instance provides.
#[async_trait]
pub trait LidarrApi: Send + Sync {
    async fn albums(&self) -> Result<Vec<Album>>;
    async fn album_by_id(&self, id: i64) -> Result<Album>;
    /// Most recent `records` history events, newest first.
    async fn history(&self, records: usize) -> Result<Vec<HistoryRecord>>;
}

#[async_trait]
impl LidarrApi for StarrClient {
    async fn albums(&self) -> Result<Vec<Album>> {
        self.get("album", &[]).await
    }

    async fn album_by_id(&self, id: i64) -> Result<Album> {
        self.get(&format!("album/{}", id), &[]).await
    }

    async fn history(&self, records: usize) -> Result<Vec<HistoryRecord>> {
        self.history_page(records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_without_artist() {
        let album: Album = serde_json::from_str(r#"{"id": 3, "title": "Blue"}"#).unwrap();
        assert_eq!(album.artist_name(), "");
        assert!(album.statistics.is_none());
    }
}
