//! Per-instance states and the per-cycle snapshot

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::ranked::RankedList;

/// A class of upstream service sharing one extraction algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Lidarr,
    Radarr,
    Readarr,
    Sonarr,
    Qbit,
    Deluge,
    Sabnzbd,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::Lidarr,
        Family::Radarr,
        Family::Readarr,
        Family::Sonarr,
        Family::Qbit,
        Family::Deluge,
        Family::Sabnzbd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Lidarr => "lidarr",
            Family::Radarr => "radarr",
            Family::Readarr => "readarr",
            Family::Sonarr => "sonarr",
            Family::Qbit => "qbit",
            Family::Deluge => "deluge",
            Family::Sabnzbd => "sabnzbd",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One snapshot of one service instance.
///
/// Only the counters relevant to the instance's family are filled in; the
/// rest stay at zero and are left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    // Shared
    pub error: String,
    pub instance: usize,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub missing: i64,
    pub size: u64,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub percent: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub upcoming: u64,
    #[serde(skip_serializing_if = "RankedList::is_empty")]
    pub next: RankedList,
    #[serde(skip_serializing_if = "RankedList::is_empty")]
    pub latest: RankedList,
    #[serde(skip_serializing_if = "is_zero")]
    pub on_disk: u64,
    #[serde(serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
    pub name: String,
    // Radarr
    #[serde(skip_serializing_if = "is_zero")]
    pub movies: u64,
    // Sonarr
    #[serde(skip_serializing_if = "is_zero")]
    pub shows: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub episodes: u64,
    // Readarr
    #[serde(skip_serializing_if = "is_zero")]
    pub authors: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub books: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub editions: u64,
    // Lidarr
    #[serde(skip_serializing_if = "is_zero")]
    pub artists: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub albums: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub tracks: u64,
    // Download clients
    #[serde(skip_serializing_if = "is_zero")]
    pub downloads: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub uploaded: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub incomplete: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub downloaded: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub uploading: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub downloading: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub seeding: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub paused: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub errors: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub month: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub week: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

fn is_zero_i64(n: &i64) -> bool {
    *n == 0
}

fn is_zero_f64(n: &f64) -> bool {
    *n == 0.0
}

fn serialize_elapsed<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&format_args!("{elapsed:?}"))
}

impl State {
    pub fn new(instance: usize, name: impl Into<String>) -> Self {
        Self {
            instance,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// Fraction-complete accumulator: each item's percent weighted by its size.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Completion {
    weighted: f64,
    total: u64,
}

impl Completion {
    pub(crate) fn add(&mut self, percent: f64, count: u64) {
        self.weighted += percent * count as f64;
        self.total += count;
    }

    /// An empty library counts as complete.
    pub(crate) fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.weighted / self.total as f64
        }
    }
}

/// The result of one collection cycle across every family.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub families: BTreeMap<Family, Vec<State>>,
    #[serde(rename = "plexSessions", skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Value>,
}

impl Snapshot {
    pub fn family(&self, family: Family) -> &[State] {
        self.families.get(&family).map(Vec::as_slice).unwrap_or_default()
    }

    /// Instances that reported an error this cycle.
    pub fn error_count(&self) -> usize {
        self.families
            .values()
            .flatten()
            .filter(|state| !state.is_ok())
            .count()
    }
}
