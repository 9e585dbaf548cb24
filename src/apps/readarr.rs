use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Result;
use super::starr::{HistoryRecord, StarrClient};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub monitored: bool,
    pub release_date: Option<DateTime<Utc>>,
    pub statistics: Option<BookStatistics>,
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookStatistics {
    pub book_file_count: u64,
    pub book_count: u64,
    pub total_book_count: u64,
    pub size_on_disk: u64,
    pub percent_of_books: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub id: i64,
    pub author_name: String,
}

impl Book {
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(|a| a.author_name.as_str()).unwrap_or_default()
    }
}

/// Records a Readarr instance provides.
#[async_trait]
pub trait ReadarrApi: Send + Sync {
    async fn books(&self) -> Result<Vec<Book>>;
    async fn book_by_id(&self, id: i64) -> Result<Book>;
    /// Most recent `records` history events, newest first.
    async fn history(&self, records: usize) -> Result<Vec<HistoryRecord>>;
}

#[async_trait]
impl ReadarrApi for StarrClient {
    async fn books(&self) -> Result<Vec<Book>> {
        self.get("book", &[]).await
    }

    async fn book_by_id(&self, id: i64) -> Result<Book> {
        self.get(&format!("book/{}", id), &[]).await
    }

    async fn history(&self, records: usize) -> Result<Vec<HistoryRecord>> {
        self.history_page(records).await
    }
}
