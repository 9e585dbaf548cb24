use std::time::Instant;

use chrono::{DateTime, Utc};

use super::{fetch_error, finalize, settle};
use crate::apps::{Movie, RadarrApi};
use crate::dashboard::ranked::Sortable;
use crate::dashboard::state::State;

pub async fn state(instance: usize, name: &str, api: &dyn RadarrApi) -> State {
    let started = Instant::now();
    let result = api
        .movies()
        .await
        .map_err(fetch_error("movies", instance))
        .map(|movies| {
            let mut state = State::new(instance, name);
            state.elapsed = started.elapsed();
            tally_movies(&mut state, &movies, Utc::now());
            state
        });

    settle(instance, name, started, result)
}

/// The digital release, unless it is unknown or a physical release is still
/// to come.
pub fn release_date(movie: &Movie, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match (movie.digital_release, movie.physical_release) {
        (None, physical) => physical,
        (Some(_), Some(physical)) if physical > now => Some(physical),
        (digital, _) => digital,
    }
}

pub fn tally_movies(state: &mut State, movies: &[Movie], now: DateTime<Utc>) {
    for movie in movies {
        state.movies += 1;
        state.size += movie.size_on_disk;

        if movie.has_file {
            if let Some(file) = &movie.movie_file {
                state.on_disk += 1;
                state
                    .latest
                    .push(Sortable::new(&movie.title, file.date_added).with_id(movie.id));
            }
            continue;
        }

        if movie.is_available {
            state.missing += 1;
        } else {
            state.upcoming += 1;
        }

        match release_date(movie, now) {
            Some(release) if release > now => {
                state
                    .next
                    .push(Sortable::new(&movie.title, release).with_id(movie.id));
            }
            _ => {}
        }
    }

    finalize(state);
}
