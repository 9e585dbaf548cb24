use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{Result, fetch_error, finalize, imports, settle};
use crate::apps::{Book, ReadarrApi};
use crate::dashboard::ranked::{LATEST_LIMIT, RankedList, Sortable};
use crate::dashboard::state::{Completion, State};

/// History records fetched per cycle.
pub const HISTORY_RECORDS: usize = 100;

const IMPORTED: &str = "bookFileImported";

pub async fn state(instance: usize, name: &str, api: &dyn ReadarrApi) -> State {
    let started = Instant::now();
    let result = build(instance, name, api, started).await;
    settle(instance, name, started, result)
}

async fn build(instance: usize, name: &str, api: &dyn ReadarrApi, started: Instant) -> Result<State> {
    let books = api.books().await.map_err(fetch_error("books", instance))?;

    let mut state = State::new(instance, name);
    state.elapsed = started.elapsed();

    tally_books(&mut state, &books, Utc::now());
    state.latest = recent_imports(api, instance).await?;
    finalize(&mut state);

    Ok(state)
}

pub fn tally_books(state: &mut State, books: &[Book], now: DateTime<Utc>) {
    let mut authors = HashSet::new();
    let mut completion = Completion::default();

    for book in books {
        state.books += 1;

        let mut have_all = false;
        if let Some(stats) = &book.statistics {
            authors.insert(book.author_id);

            let missing = stats.book_count as i64 - stats.book_file_count as i64;
            have_all = missing <= 0;

            state.size += stats.size_on_disk;
            state.editions += stats.total_book_count;
            state.on_disk += stats.book_file_count;
            state.missing += missing;
            completion.add(stats.percent_of_books, stats.total_book_count);
        }

        if have_all || !book.monitored {
            continue;
        }

        match book.release_date {
            Some(release) if release > now => state.next.push(
                Sortable::new(&book.title, release)
                    .with_id(book.id)
                    .with_sub(book.author_name()),
            ),
            _ => {}
        }
    }

    state.authors = authors.len() as u64;
    state.percent = completion.percent();
}

async fn recent_imports(api: &dyn ReadarrApi, instance: usize) -> Result<RankedList> {
    let records = api
        .history(HISTORY_RECORDS)
        .await
        .map_err(fetch_error("history", instance))?;

    let mut latest = RankedList::new();

    for record in imports(&records, IMPORTED, |r| r.book_id) {
        if latest.len() >= LATEST_LIMIT {
            break;
        }

        match api.book_by_id(record.book_id).await {
            Ok(book) => latest.push(
                Sortable::new(&book.title, record.date)
                    .with_id(book.id)
                    .with_sub(book.author_name()),
            ),
            Err(e) => debug!(instance, book_id = record.book_id, error = %e, "skipping history record"),
        }
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{BookStatistics, FetchError, HistoryRecord};
    use crate::apps::readarr::Author;
    use crate::dashboard::extract::fakes;
    use async_trait::async_trait;
    use chrono::Duration;

    struct FakeReadarr {
        books: Vec<Book>,
        history: Vec<HistoryRecord>,
    }

    #[async_trait]
    impl ReadarrApi for FakeReadarr {
        async fn books(&self) -> std::result::Result<Vec<Book>, FetchError> {
            Ok(self.books.clone())
        }

        async fn book_by_id(&self, id: i64) -> std::result::Result<Book, FetchError> {
            self.books
                .iter()
                .find(|b| b.id == id)
                .cloned()
                .ok_or_else(fakes::unreachable)
        }

        async fn history(&self, _records: usize) -> std::result::Result<Vec<HistoryRecord>, FetchError> {
            Ok(self.history.clone())
        }
    }

    fn book(id: i64, author_id: i64, count: u64, files: u64) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            author_id,
            monitored: true,
            release_date: None,
            statistics: Some(BookStatistics {
                book_file_count: files,
                book_count: count,
                total_book_count: count,
                size_on_disk: files * 10,
                percent_of_books: if count == 0 { 0.0 } else { files as f64 * 100.0 / count as f64 },
            }),
            author: Some(Author {
                id: author_id,
                author_name: format!("Author {author_id}"),
            }),
        }
    }

    #[test]
    fn test_tally_books() {
        let now = Utc::now();
        let mut upcoming = book(3, 2, 1, 0);
        upcoming.release_date = Some(now + Duration::days(10));
        let mut unmonitored = book(4, 2, 1, 0);
        unmonitored.monitored = false;
        unmonitored.release_date = Some(now + Duration::days(5));

        let books = vec![book(1, 1, 2, 2), book(2, 1, 2, 1), upcoming, unmonitored];
        let mut state = State::new(1, "Readarr");
        tally_books(&mut state, &books, now);

        assert_eq!(state.books, 4);
        assert_eq!(state.authors, 2);
        assert_eq!(state.editions, 6);
        assert_eq!(state.on_disk, 3);
        assert_eq!(state.missing, 3);
        assert!((state.percent - 50.0).abs() < 1e-9);
        assert_eq!(state.next.len(), 1);
        assert_eq!(state.next.items()[0].sub, "Author 2");
    }

    #[tokio::test]
    async fn test_history_skips_missing_books() {
        let now = Utc::now();
        let mut history = Vec::new();
        for (id, book_id) in [(1, 1), (2, 404), (3, 1), (4, 2)] {
            let mut record = fakes::record(id, IMPORTED, now - Duration::minutes(id));
            record.book_id = book_id;
            history.push(record);
        }

        let fake = FakeReadarr {
            books: vec![book(1, 1, 1, 1), book(2, 1, 1, 1)],
            history,
        };

        let state = state(1, "Readarr", &fake).await;
        assert!(state.is_ok());
        let names: Vec<&str> = state.latest.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Book 1", "Book 2"]);
    }
}
