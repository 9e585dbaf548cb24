use std::time::Instant;

use chrono::{DateTime, Utc};

use super::{eta_date, fetch_error, finalize, settle};
use crate::apps::qbit::ETA_INFINITY;
use crate::apps::{QbitApi, QbitTransfer};
use crate::dashboard::ranked::Sortable;
use crate::dashboard::state::State;

pub async fn state(instance: usize, name: &str, api: &dyn QbitApi) -> State {
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

pub fn tally_transfers(state: &mut State, transfers: &[QbitTransfer], now: DateTime<Utc>) {
    for transfer in transfers {
        state.downloads += 1;
        state.size += transfer.size.max(0) as u64;
        state.uploaded += transfer.uploaded.max(0) as u64;
        state.downloaded += transfer.downloaded.max(0) as u64;

        match transfer.state.trim().to_lowercase().as_str() {
            "stalledup" | "moving" | "forcedup" => state.seeding += 1,
            "downloading" | "forceddl" => state.downloading += 1,
            "uploading" => state.uploading += 1,
            "pausedup" | "pauseddl" | "stoppedup" | "stoppeddl" => state.paused += 1,
            "queuedup" | "checkingup" | "allocating" | "metadl" | "queueddl" | "stalleddl"
            | "checkingdl" | "checkingresumedata" | "forcedmetadl" => state.incomplete += 1,
            _ => state.errors += 1,
        }

        if transfer.amount_left > 0 {
            if transfer.eta != 0 && transfer.eta != ETA_INFINITY {
                state
                    .next
                    .push(Sortable::new(&transfer.name, eta_date(now, transfer.eta)));
            }
        } else if let Some(done) = DateTime::from_timestamp(transfer.completion_on, 0)
            .filter(|_| transfer.completion_on > 0)
        {
            state.latest.push(Sortable::new(&transfer.name, done));
        }
    }

    finalize(state);
}
