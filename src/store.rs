//! In-memory keyed store shared with other subsystems
//!
//! Other parts of the agent publish values here (Plex sessions under
//! [`PLEX_SESSIONS_KEY`]); the dashboard reads them read-only and saves its
//! own latest snapshot under [`DASHBOARD_KEY`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

/// Where the current Plex sessions are published.
pub const PLEX_SESSIONS_KEY: &str = "plexCurrentSessions";

/// Where each cycle's snapshot is saved.
pub const DASHBOARD_KEY: &str = "dashboard";

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub data: Value,
    pub saved: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct DataStore {
    items: Arc<RwLock<HashMap<String, Item>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was stored under `key`.
    pub async fn save(&self, key: impl Into<String>, data: Value) {
        let item = Item {
            data,
            saved: Utc::now(),
        };
        self.items.write().await.insert(key.into(), item);
    }

    pub async fn get(&self, key: &str) -> Option<Item> {
        self.items.read().await.get(key).cloned()
    }

    pub async fn delete(&self, key: &str) -> Option<Item> {
        self.items.write().await.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_and_get() {
        let store = DataStore::new();
        assert!(store.get(PLEX_SESSIONS_KEY).await.is_none());

        store.save(PLEX_SESSIONS_KEY, json!({"size": 1})).await;
        let item = store.get(PLEX_SESSIONS_KEY).await.unwrap();
        assert_eq!(item.data["size"], 1);

        store.save(PLEX_SESSIONS_KEY, json!({"size": 2})).await;
        assert_eq!(store.get(PLEX_SESSIONS_KEY).await.unwrap().data["size"], 2);
    }

    #[tokio::test]
    async fn test_clones_share_items() {
        let store = DataStore::new();
        let other = store.clone();
        other.save(DASHBOARD_KEY, json!([])).await;
        assert!(store.delete(DASHBOARD_KEY).await.is_some());
        assert!(other.get(DASHBOARD_KEY).await.is_none());
    }
}
