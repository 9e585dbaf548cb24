//! State extractors, one per family
//!
//! Each submodule exposes `state(instance, name, api)`, which fetches from one
//! instance and always returns a [`State`]: on failure the counters stay at
//! zero and `error` carries the [`ExtractError`] text. The counting itself
//! lives in plain functions taking the fetched records and `now`, so it can be
//! tested without a fetcher.

pub mod deluge;
pub mod lidarr;
pub mod qbit;
pub mod radarr;
pub mod readarr;
pub mod sabnzbd;
pub mod sonarr;

use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use super::state::State;
use crate::apps::{FetchError, HistoryRecord};
use crate::decode::UNKNOWN_OFFSET_DAYS;
use crate::decode::{DecodeError, DecodedSize};

/// Why one instance produced no counters this cycle.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("getting {resource} from instance {instance}: {source}")]
    Fetch {
        resource: &'static str,
        instance: usize,
        #[source]
        source: FetchError,
    },

    #[error("decoding {field} from instance {instance}: {source}")]
    Decode {
        field: &'static str,
        instance: usize,
        #[source]
        source: DecodeError,
    },
}

impl ExtractError {
    pub fn instance(&self) -> usize {
        match self {
            ExtractError::Fetch { instance, .. } | ExtractError::Decode { instance, .. } => *instance,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

/// `map_err` adapter naming the resource that failed.
pub(crate) fn fetch_error(
    resource: &'static str,
    instance: usize,
) -> impl FnOnce(FetchError) -> ExtractError {
    move |source| ExtractError::Fetch {
        resource,
        instance,
        source,
    }
}

/// Turn an extraction result into the state reported for the instance.
pub(crate) fn settle(instance: usize, name: &str, started: Instant, result: Result<State>) -> State {
    match result {
        Ok(state) => state,
        Err(e) => {
            let mut state = State::new(instance, name);
            state.elapsed = started.elapsed();
            state.error = e.to_string();
            state
        }
    }
}

/// Sort and truncate both ranked lists.
pub(crate) fn finalize(state: &mut State) {
    state.next = std::mem::take(&mut state.next).finalize_next();
    state.latest = std::mem::take(&mut state.latest).finalize_latest();
}

/// Decode a unit-suffixed size; an absent value counts as zero.
pub(crate) fn decode_bytes(raw: &str, field: &'static str, instance: usize) -> Result<u64> {
    if raw.trim().is_empty() {
        return Ok(0);
    }

    raw.parse::<DecodedSize>()
        .map(|size| size.as_u64())
        .map_err(|source| ExtractError::Decode {
            field,
            instance,
            source,
        })
}

/// `now` plus an upstream ETA in seconds. An ETA too large for a date is
/// treated like an unknown one and lands [`UNKNOWN_OFFSET_DAYS`] out.
pub(crate) fn eta_date(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(secs)
        .and_then(|eta| now.checked_add_signed(eta))
        .unwrap_or_else(|| now + TimeDelta::days(UNKNOWN_OFFSET_DAYS))
}

/// `now` minus an upstream age in seconds, or `None` when that predates
/// anything a date can hold.
pub(crate) fn age_date(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(secs).and_then(|age| now.checked_sub_signed(age))
}

/// History records of `event_type`, newest first, keeping only the first
/// record seen for each `key`.
pub(crate) fn imports<'a>(
    records: &'a [HistoryRecord],
    event_type: &'a str,
    key: fn(&HistoryRecord) -> i64,
) -> impl Iterator<Item = &'a HistoryRecord> + 'a {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(move |record| record.event_type == event_type && seen.insert(key(record)))
}
