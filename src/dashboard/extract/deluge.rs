use std::time::Instant;

use chrono::{DateTime, Utc};

use super::{age_date, eta_date, fetch_error, finalize, settle};
use crate::apps::{DelugeApi, DelugeTransfer};
use crate::dashboard::ranked::Sortable;
use crate::dashboard::state::State;

pub async fn state(instance: usize, name: &str, api: &dyn DelugeApi) -> State {
    let started = Instant::now();
    let result = api
        .transfers()
        .await
        .map_err(fetch_error("transfers", instance))
        .map(|transfers| {
            let mut state = State::new(instance, name);
            state.elapsed = started.elapsed();
            tally_transfers(&mut state, &transfers, Utc::now());
            state
        });

    settle(instance, name, started, result)
}

pub fn tally_transfers(state: &mut State, transfers: &[DelugeTransfer], now: DateTime<Utc>) {
    for transfer in transfers {
        state.downloads += 1;
        state.size += transfer.total_size;
        state.uploaded += transfer.total_uploaded;
        state.downloaded += transfer.all_time_download;

        match transfer.state.trim().to_lowercase().as_str() {
            "downloading" => state.downloading += 1,
            "seeding" if transfer.upload_payload_rate > 0.0 => state.uploading += 1,
            "seeding" => state.seeding += 1,
            "paused" => state.paused += 1,
            "queued" | "checking" | "allocating" | "moving" => state.incomplete += 1,
            _ => state.errors += 1,
        }

        if transfer.finished_time > 0.0 {
            if let Some(done) = age_date(now, transfer.finished_time.round() as i64) {
                state.latest.push(Sortable::new(&transfer.name, done));
            }
        } else if transfer.eta != 0.0 && !transfer.is_finished {
            let eta = eta_date(now, transfer.eta.round() as i64);
            state.next.push(Sortable::new(&transfer.name, eta));
        }
    }

    finalize(state);
}
