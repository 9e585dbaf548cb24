//! Shared client for the *arr media managers

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::http::{HttpClient, join};
use super::Result;

/// Newest-first page of history records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryPage {
    pub page: i64,
    pub page_size: i64,
    pub total_records: i64,
    pub records: Vec<HistoryRecord>,
}

/// One history event. Only the id relevant to the family is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(default)]
    pub id: i64,
    pub event_type: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub series_id: i64,
    #[serde(default)]
    pub episode_id: i64,
    #[serde(default)]
    pub book_id: i64,
    #[serde(default)]
    pub author_id: i64,
    #[serde(default)]
    pub album_id: i64,
    #[serde(default)]
    pub artist_id: i64,
    #[serde(default)]
    pub source_title: String,
    /// Event-specific details; the shape varies per event type.
    #[serde(default)]
    pub data: Value,
}

/// HTTP client for one Radarr, Sonarr, Readarr or Lidarr instance.
#[derive(Debug, Clone)]
pub struct StarrClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    api_version: &'static str,
}

impl StarrClient {
    /// Radarr and Sonarr speak API v3.
    pub fn v3(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(http, base_url, api_key, "v3")
    }

    /// Readarr and Lidarr speak API v1.
    pub fn v1(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(http, base_url, api_key, "v1")
    }

    fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_version: &'static str,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version,
        }
    }

    pub(crate) async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = join(&self.base_url, &format!("api/{}/{}", self.api_version, path));
        self.http
            .get_json(&url, query, &[("X-Api-Key", self.api_key.as_str())])
            .await
    }

    /// Most recent `records` history events, newest first.
    pub(crate) async fn history_page(&self, records: usize) -> Result<Vec<HistoryRecord>> {
        let query = [
            ("page", "1".to_string()),
            ("pageSize", records.to_string()),
            ("sortKey", "date".to_string()),
            ("sortDirection", "descending".to_string()),
        ];

        let page: HistoryPage = self.get("history", &query).await?;
        Ok(page.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_page_decodes() {
        let json = r#"{
            "page": 1,
            "pageSize": 100,
            "totalRecords": 2,
            "records": [
                {"id": 9, "eventType": "trackFileImported", "date": "2026-10-17T13:42:00Z",
                 "albumId": 12, "artistId": 3, "data": {"droppedPath": "/x"}},
                {"id": 8, "eventType": "grabbed", "date": "2026-10-16T10:00:00Z", "albumId": 12}
            ]
        }"#;

        let page: HistoryPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].album_id, 12);
        assert_eq!(page.records[0].event_type, "trackFileImported");
        assert_eq!(page.records[0].data["droppedPath"], "/x");
        assert!(page.records[1].data.is_null());
    }
}
