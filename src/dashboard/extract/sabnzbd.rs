use std::time::Instant;

use chrono::{DateTime, Utc};

use super::{ExtractError, Result, decode_bytes, fetch_error, finalize, settle};
use crate::apps::{SabHistory, SabQueue, SabnzbdApi};
use crate::dashboard::ranked::Sortable;
use crate::dashboard::state::State;
use crate::decode::DecodedDate;

pub async fn state(instance: usize, name: &str, api: &dyn SabnzbdApi) -> State {
    let started = Instant::now();
    let result = build(instance, name, api, started).await;
    settle(instance, name, started, result)
}

async fn build(instance: usize, name: &str, api: &dyn SabnzbdApi, started: Instant) -> Result<State> {
    let queue = api.queue().await.map_err(fetch_error("queue", instance))?;
    let history = api.history().await.map_err(fetch_error("history", instance))?;

    let mut state = State::new(instance, name);
    state.elapsed = started.elapsed();
    tally(&mut state, &queue, &history, Utc::now())?;

    Ok(state)
}

/// Fill `state` from one queue and history pair.
pub fn tally(state: &mut State, queue: &SabQueue, history: &SabHistory, now: DateTime<Utc>) -> Result<()> {
    let instance = state.instance;

    state.size = decode_bytes(&history.total_size, "total_size", instance)?;
    state.month = decode_bytes(&history.month_size, "month_size", instance)?;
    state.week = decode_bytes(&history.week_size, "week_size", instance)?;
    state.downloads = queue.slots.len() as u64 + history.noofslots;

    for slot in &queue.slots {
        match slot.status.trim().to_lowercase().as_str() {
            "downloading" => state.downloading += 1,
            "paused" => state.paused += 1,
            "queued" | "fetching" | "grabbing" | "propagating" | "checking" | "verifying"
            | "repairing" | "extracting" | "moving" | "running" => state.incomplete += 1,
            _ => state.errors += 1,
        }

        if slot.mbleft > 0.0 {
            let eta = DecodedDate::parse_at(&slot.eta, now).map_err(|source| ExtractError::Decode {
                field: "eta",
                instance,
                source,
            })?;
            state.next.push(Sortable::new(&slot.filename, eta.time));
        }
    }

    for slot in &history.slots {
        if slot.fail_message.is_empty() {
            state.downloaded += 1;
        } else {
            state.errors += 1;
        }

        if let Some(completed) = DateTime::from_timestamp(slot.completed, 0) {
            state.latest.push(Sortable::new(&slot.name, completed).with_id(slot.id));
        }
    }

    finalize(state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{FetchError, SabHistorySlot, SabQueueSlot};
    use crate::dashboard::extract::fakes;
    use async_trait::async_trait;
    use chrono::{Datelike, Duration, Timelike};

    struct FakeSab {
        queue: SabQueue,
        history: Option<SabHistory>,
    }

    #[async_trait]
    impl SabnzbdApi for FakeSab {
        async fn queue(&self) -> std::result::Result<SabQueue, FetchError> {
            Ok(self.queue.clone())
        }

        async fn history(&self) -> std::result::Result<SabHistory, FetchError> {
            self.history.clone().ok_or_else(fakes::unreachable)
        }
    }

    fn queue_slot(filename: &str, status: &str, mbleft: f64, eta: &str) -> SabQueueSlot {
        SabQueueSlot {
            filename: filename.to_string(),
            status: status.to_string(),
            mbleft,
            eta: eta.to_string(),
            ..Default::default()
        }
    }

    fn history_slot(name: &str, completed: i64, fail_message: &str) -> SabHistorySlot {
        SabHistorySlot {
            name: name.to_string(),
            completed,
            fail_message: fail_message.to_string(),
            ..Default::default()
        }
    }

    fn history() -> SabHistory {
        SabHistory {
            total_size: "1.5 G".to_string(),
            month_size: "512 M".to_string(),
            week_size: "2 K".to_string(),
            noofslots: 40,
            slots: vec![
                history_slot("old", 1_600_000_000, ""),
                history_slot("broken", 1_700_000_000, "CRC error"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_tally() {
        let now = Utc::now();
        let queue = SabQueue {
            slots: vec![
                queue_slot("later", "Downloading", 500.0, "unknown"),
                queue_slot("sooner", "Queued", 10.0, "13:42 Sun 17 Oct"),
                queue_slot("parked", "Paused", 0.0, ""),
                queue_slot("odd", "Failed", 0.0, ""),
            ],
            ..Default::default()
        };

        let mut state = State::new(1, "SABnzbd");
        tally(&mut state, &queue, &history(), now).unwrap();

        assert_eq!(state.size, (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert_eq!(state.month, 512 * 1024 * 1024);
        assert_eq!(state.week, 2048);
        assert_eq!(state.downloads, 44);
        assert_eq!(state.downloading, 1);
        assert_eq!(state.incomplete, 1);
        assert_eq!(state.paused, 1);
        assert_eq!(state.errors, 2);
        assert_eq!(state.downloaded, 1);

        let next = state.next.items();
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].name, "sooner");
        assert_eq!(next[0].date.year(), now.year());
        assert_eq!((next[0].date.hour(), next[0].date.minute()), (13, 42));
        assert!(next[1].date >= now + Duration::days(365));

        let latest: Vec<&str> = state.latest.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(latest, vec!["broken", "old"]);
    }

    #[test]
    fn test_bad_size_is_decode_error() {
        let mut history = history();
        history.week_size = "3 XB".to_string();

        let mut state = State::new(2, "SABnzbd");
        let err = tally(&mut state, &SabQueue::default(), &history, Utc::now()).unwrap_err();
        assert!(err.to_string().starts_with("decoding week_size from instance 2"));
    }

    #[tokio::test]
    async fn test_history_failure_fails_instance() {
        let fake = FakeSab {
            queue: SabQueue::default(),
            history: None,
        };

        let state = state(1, "SABnzbd", &fake).await;
        assert!(state.error.starts_with("getting history from instance 1"));
        assert_eq!(state.downloads, 0);
    }

    #[tokio::test]
    async fn test_state_success() {
        let fake = FakeSab {
            queue: SabQueue::default(),
            history: Some(history()),
        };

        let state = state(1, "SABnzbd", &fake).await;
        assert!(state.is_ok());
        assert_eq!(state.downloads, 40);
    }
}
