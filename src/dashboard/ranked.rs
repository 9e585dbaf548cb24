//! Bounded, date-ordered lists of upcoming and recently finished items

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many upcoming items a state carries.
pub const NEXT_LIMIT: usize = 10;

/// How many recently finished items a state carries.
pub const LATEST_LIMIT: usize = 5;

/// One entry of a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sortable {
    /// Correlates an entry with its upstream record during extraction.
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "subName", default, skip_serializing_if = "String::is_empty")]
    pub sub: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub season: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub episode: i64,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl Sortable {
    pub fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            sub: String::new(),
            date,
            season: 0,
            episode: 0,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = sub.into();
        self
    }

    pub fn with_episode(mut self, season: i64, episode: i64) -> Self {
        self.season = season;
        self.episode = episode;
        self
    }
}

/// Sort direction for [`RankedList::finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Soonest first; used for upcoming items.
    Ascending,
    /// Newest first; used for finished items.
    Descending,
}

impl Order {
    pub fn compare(self, a: &Sortable, b: &Sortable) -> Ordering {
        match self {
            Order::Ascending => a.date.cmp(&b.date),
            Order::Descending => b.date.cmp(&a.date),
        }
    }
}

/// A list of [`Sortable`] entries.
///
/// Entries are pushed unordered during extraction; [`finalize`](Self::finalize)
/// sorts and truncates. Equal dates keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedList(Vec<Sortable>);

impl RankedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Sortable) {
        self.0.push(item);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[Sortable] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sortable> {
        self.0.iter()
    }

    /// Sort by date in `order` and keep at most `max` entries.
    ///
    /// Finalizing an already finalized list with the same arguments returns it
    /// unchanged.
    pub fn finalize(mut self, order: Order, max: usize) -> Self {
        self.0.sort_by(|a, b| order.compare(a, b));
        self.0.truncate(max);
        self
    }

    /// Upcoming items: ascending, [`NEXT_LIMIT`] long.
    pub fn finalize_next(self) -> Self {
        self.finalize(Order::Ascending, NEXT_LIMIT)
    }

    /// Finished items: descending, [`LATEST_LIMIT`] long.
    pub fn finalize_latest(self) -> Self {
        self.finalize(Order::Descending, LATEST_LIMIT)
    }
}

impl FromIterator<Sortable> for RankedList {
    fn from_iter<I: IntoIterator<Item = Sortable>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RankedList {
    type Item = Sortable;
    type IntoIter = std::vec::IntoIter<Sortable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a Sortable;
    type IntoIter = std::slice::Iter<'a, Sortable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn list_of(offsets: &[i64]) -> RankedList {
        let base = Utc::now();
        offsets
            .iter()
            .map(|h| Sortable::new(format!("item {h}"), base + Duration::hours(*h)))
            .collect()
    }

    fn is_sorted(list: &RankedList, order: Order) -> bool {
        list.items()
            .windows(2)
            .all(|w| order.compare(&w[0], &w[1]) != Ordering::Greater)
    }

    #[test]
    fn test_finalize_ascending_truncates() {
        let list = list_of(&[5, -3, 12, 0, 7, 1, 9, 2, 8, 4, 6, 3]).finalize_next();
        assert_eq!(list.len(), NEXT_LIMIT);
        assert!(is_sorted(&list, Order::Ascending));
        assert_eq!(list.items()[0].name, "item -3");
        assert!(list.iter().all(|s| s.name != "item 12"));
    }

    #[test]
    fn test_finalize_descending_truncates() {
        let list = list_of(&[1, 4, 2, 8, 5, 7, 3]).finalize_latest();
        assert_eq!(list.len(), LATEST_LIMIT);
        assert!(is_sorted(&list, Order::Descending));
        assert_eq!(list.items()[0].name, "item 8");
        assert_eq!(list.items()[4].name, "item 3");
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let once = list_of(&[3, 1, 2, 9, 4, 6, 5]).finalize(Order::Descending, 4);
        let twice = once.clone().finalize(Order::Descending, 4);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_short_list_is_kept() {
        let list = list_of(&[2, 1]).finalize_next();
        assert_eq!(list.len(), 2);
        assert!(is_sorted(&list, Order::Ascending));
    }

    #[test]
    fn test_serialize_omits_empty_fields() {
        let item = Sortable::new("Movie", Utc::now()).with_id(77);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("subName").is_none());
        assert!(json.get("season").is_none());
        assert!(json.get("id").is_none());

        let item = Sortable::new("Show", Utc::now())
            .with_sub("Pilot")
            .with_episode(1, 2);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["subName"], "Pilot");
        assert_eq!(json["season"], 1);
        assert_eq!(json["episode"], 2);
    }
}
