use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{Result, fetch_error, finalize, imports, settle};
use crate::apps::{Album, LidarrApi};
use crate::dashboard::ranked::{LATEST_LIMIT, RankedList, Sortable};
use crate::dashboard::state::{Completion, State};

/// Lidarr logs one import per track, so it needs a deeper page than the
/// other managers to find five distinct albums.
pub const HISTORY_RECORDS: usize = 200;

const IMPORTED: &str = "trackFileImported";

pub async fn state(instance: usize, name: &str, api: &dyn LidarrApi) -> State {
    let started = Instant::now();
    let result = build(instance, name, api, started).await;
    settle(instance, name, started, result)
}

async fn build(instance: usize, name: &str, api: &dyn LidarrApi, started: Instant) -> Result<State> {
    let albums = api.albums().await.map_err(fetch_error("albums", instance))?;

    let mut state = State::new(instance, name);
    state.elapsed = started.elapsed();

    tally_albums(&mut state, &albums, Utc::now());
    state.latest = recent_imports(api, instance).await?;
    finalize(&mut state);

    Ok(state)
}

pub fn tally_albums(state: &mut State, albums: &[Album], now: DateTime<Utc>) {
    let mut artists = HashSet::new();
    let mut completion = Completion::default();

    for album in albums {
        state.albums += 1;
        artists.insert(album.artist_id);

        let mut have_all = false;
        if let Some(stats) = &album.statistics {
            let missing = stats.track_count as i64 - stats.track_file_count as i64;
            have_all = missing <= 0;

            state.size += stats.size_on_disk;
            state.tracks += stats.total_track_count;
            state.on_disk += stats.track_file_count;
            state.missing += missing;
            completion.add(stats.percent_of_tracks, stats.total_track_count);
        }

        if have_all || !album.monitored {
            continue;
        }

        if let Some(release) = album.release_date.filter(|release| *release > now) {
            state.next.push(
                Sortable::new(&album.title, release)
                    .with_id(album.id)
                    .with_sub(album.artist_name()),
            );
        }
    }

    state.artists = artists.len() as u64;
    state.percent = completion.percent();
}

async fn recent_imports(api: &dyn LidarrApi, instance: usize) -> Result<RankedList> {
    let records = api
        .history(HISTORY_RECORDS)
        .await
        .map_err(fetch_error("history", instance))?;

    let mut latest = RankedList::new();

    for record in imports(&records, IMPORTED, |r| r.album_id) {
        if latest.len() >= LATEST_LIMIT {
            break;
        }

        let album = match api.album_by_id(record.album_id).await {
            Ok(album) => album,
            Err(e) => {
                debug!(instance, album_id = record.album_id, error = %e, "skipping history record");
                continue;
            }
        };

        latest.push(
            Sortable::new(&album.title, record.date)
                .with_id(album.id)
                .with_sub(album.artist_name()),
        );
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{AlbumStatistics, FetchError, HistoryRecord};
    use crate::dashboard::extract::fakes;
    use async_trait::async_trait;
    use chrono::Duration;

    struct FakeLidarr {
        albums: Vec<Album>,
        history: Vec<HistoryRecord>,
    }

    #[async_trait]
    impl LidarrApi for FakeLidarr {
        async fn albums(&self) -> std::result::Result<Vec<Album>, FetchError> {
            Ok(self.albums.clone())
        }

        async fn album_by_id(&self, id: i64) -> std::result::Result<Album, FetchError> {
            self.albums
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .ok_or_else(fakes::unreachable)
        }

        async fn history(&self, records: usize) -> std::result::Result<Vec<HistoryRecord>, FetchError> {
            assert_eq!(records, HISTORY_RECORDS);
            Ok(self.history.clone())
        }
    }

    fn album(id: i64, artist_id: i64, tracks: u64, files: u64) -> Album {
        Album {
            id,
            title: format!("Album {id}"),
            artist_id,
            monitored: true,
            statistics: Some(AlbumStatistics {
                track_file_count: files,
                track_count: tracks,
                total_track_count: tracks,
                size_on_disk: files,
                percent_of_tracks: 0.0,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_tracks_is_complete() {
        let mut state = State::new(1, "Lidarr");
        tally_albums(&mut state, &[album(1, 1, 0, 0)], Utc::now());
        assert_eq!(state.albums, 1);
        assert_eq!(state.percent, 100.0);
    }

    #[tokio::test]
    async fn test_latest_stops_at_limit() {
        let now = Utc::now();
        let albums: Vec<Album> = (1..=8).map(|id| album(id, id % 3, 10, 10)).collect();
        let history = (1..=8)
            .flat_map(|id| {
                (0..3).map(move |track| {
                    let mut record =
                        fakes::record(id * 10 + track, IMPORTED, now - Duration::minutes(id * 10 + track));
                    record.album_id = id;
                    record
                })
            })
            .collect();

        let state = state(1, "Lidarr", &FakeLidarr { albums, history }).await;
        assert!(state.is_ok());
        assert_eq!(state.artists, 3);
        assert_eq!(state.tracks, 80);
        assert_eq!(state.latest.len(), LATEST_LIMIT);

        let ids: HashSet<i64> = state.latest.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), LATEST_LIMIT);
        assert_eq!(state.latest.items()[0].name, "Album 1");
    }
}
