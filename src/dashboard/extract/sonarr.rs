use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{Result, fetch_error, finalize, imports, settle};
use crate::apps::{Series, SonarrApi};
use crate::dashboard::ranked::{LATEST_LIMIT, NEXT_LIMIT, RankedList, Sortable};
use crate::dashboard::state::{Completion, State};

/// History records fetched per cycle.
pub const HISTORY_RECORDS: usize = 100;

const IMPORTED: &str = "downloadFolderImported";

pub async fn state(instance: usize, name: &str, api: &dyn SonarrApi) -> State {
    let started = Instant::now();
    let result = build(instance, name, api, started).await;
    settle(instance, name, started, result)
}

async fn build(instance: usize, name: &str, api: &dyn SonarrApi, started: Instant) -> Result<State> {
    let series = api
        .all_series()
        .await
        .map_err(fetch_error("series", instance))?;

    let mut state = State::new(instance, name);
    state.elapsed = started.elapsed();

    let now = Utc::now();
    let candidates = tally_series(&mut state, &series, now);
    state.next = next_episodes(api, instance, &candidates).await?;
    state.latest = recent_imports(api, instance).await?;
    finalize(&mut state);

    Ok(state)
}

/// Sum library statistics into `state`, returning the series with a future
/// airing, soonest first.
pub fn tally_series<'a>(state: &mut State, series: &'a [Series], now: DateTime<Utc>) -> Vec<&'a Series> {
    let mut completion = Completion::default();
    let mut candidates = Vec::new();

    for show in series {
        state.shows += 1;

        if let Some(stats) = &show.statistics {
            state.size += stats.size_on_disk;
            state.episodes += stats.total_episode_count;
            state.on_disk += stats.episode_file_count;
            state.missing += stats.episode_count as i64 - stats.episode_file_count as i64;
            completion.add(stats.percent_of_episodes, stats.total_episode_count);
        }

        if show.next_airing.is_some_and(|airing| airing > now) {
            candidates.push(show);
        }
    }

    state.percent = completion.percent();
    candidates.sort_by_key(|show| show.next_airing);
    candidates
}

/// Resolve each candidate to the episode airing on its next airing day.
async fn next_episodes(api: &dyn SonarrApi, instance: usize, candidates: &[&Series]) -> Result<RankedList> {
    let mut next = RankedList::new();

    for show in candidates {
        if next.len() >= NEXT_LIMIT {
            break;
        }

        let Some(airing) = show.next_airing else {
            continue;
        };

        let episodes = api
            .series_episodes(show.id)
            .await
            .map_err(fetch_error("episodes", instance))?;

        let episode = episodes.iter().find(|ep| {
            ep.season_number != 0
                && ep.episode_number != 0
                && ep
                    .air_date_utc
                    .is_some_and(|aired| aired.date_naive() == airing.date_naive())
        });

        let item = Sortable::new(&show.title, airing).with_id(show.id);
        next.push(match episode {
            Some(ep) => item
                .with_sub(&ep.title)
                .with_episode(ep.season_number, ep.episode_number),
            None => item,
        });
    }

    Ok(next)
}

async fn recent_imports(api: &dyn SonarrApi, instance: usize) -> Result<RankedList> {
    let records = api
        .history(HISTORY_RECORDS)
        .await
        .map_err(fetch_error("history", instance))?;

    let mut latest = RankedList::new();

    for record in imports(&records, IMPORTED, |r| r.episode_id) {
        if latest.len() >= LATEST_LIMIT {
            break;
        }

        let series = match api.series_by_id(record.series_id).await {
            Ok(series) => series,
            Err(e) => {
                debug!(instance, series_id = record.series_id, error = %e, "skipping history record");
                continue;
            }
        };

        let episodes = match api.series_episodes(record.series_id).await {
            Ok(episodes) => episodes,
            Err(e) => {
                debug!(instance, series_id = record.series_id, error = %e, "skipping history record");
                continue;
            }
        };

        let Some(episode) = episodes.iter().find(|ep| ep.id == record.episode_id) else {
            debug!(instance, episode_id = record.episode_id, "history episode no longer exists");
            continue;
        };

        latest.push(
            Sortable::new(&series.title, record.date)
                .with_id(episode.id)
                .with_sub(&episode.title)
                .with_episode(episode.season_number, episode.episode_number),
        );
    }

    Ok(latest)
}
