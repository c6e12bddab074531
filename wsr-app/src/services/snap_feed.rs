//! In-memory snap feed, newest first
//!
//! Append-only: snaps are prepended and never removed or mutated in place.
//! Identifier uniqueness is assumed, not enforced.

use std::collections::vec_deque;
use std::collections::VecDeque;
use std::sync::Arc;

use wsr_common::{Snap, SnapId};

#[derive(Debug, Default)]
pub struct SnapFeed {
    snaps: VecDeque<Arc<Snap>>,
}

impl SnapFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a feed whose order is the iteration order (first = newest)
    pub fn from_snaps(snaps: impl IntoIterator<Item = Snap>) -> Self {
        Self {
            snaps: snaps.into_iter().map(Arc::new).collect(),
        }
    }

    /// Feed preloaded with the seed snaps
    pub fn seeded(now_ms: i64) -> Self {
        Self::from_snaps(super::seed::seed_snaps(now_ms))
    }

    /// Prepend a snap; returns the shared handle stored in the feed
    pub fn append(&mut self, snap: Snap) -> Arc<Snap> {
        let snap = Arc::new(snap);
        self.snaps.push_front(Arc::clone(&snap));
        snap
    }

    /// Current ordered view, newest first
    pub fn all(&self) -> vec_deque::Iter<'_, Arc<Snap>> {
        self.snaps.iter()
    }

    pub fn get(&self, id: &SnapId) -> Option<&Arc<Snap>> {
        self.snaps.iter().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.snaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snaps.is_empty()
    }

    /// Owned copy of the feed for serialization
    pub fn to_vec(&self) -> Vec<Snap> {
        self.snaps.iter().map(|s| s.as_ref().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsr_common::GeoPoint;

    fn snap(id: &str) -> Snap {
        Snap::new(
            SnapId::new(id),
            format!("https://example.com/{id}.jpg"),
            GeoPoint::new(10.0, 20.0).unwrap(),
            "tester",
            0,
        )
    }

    #[test]
    fn test_append_prepends() {
        let mut feed = SnapFeed::new();
        feed.append(snap("a"));
        feed.append(snap("b"));
        feed.append(snap("c"));

        let ids: Vec<&str> = feed.all().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(feed.len(), 3);
    }

    #[test]
    fn test_existing_entries_are_shared_not_copied() {
        let mut feed = SnapFeed::from_snaps(vec![snap("a")]);
        let before = Arc::clone(feed.get(&SnapId::new("a")).unwrap());

        feed.append(snap("b"));

        let after = feed.get(&SnapId::new("a")).unwrap();
        assert!(Arc::ptr_eq(&before, after));
    }

    #[test]
    fn test_from_snaps_keeps_given_order() {
        let feed = SnapFeed::from_snaps(vec![snap("1"), snap("2"), snap("3")]);
        let ids: Vec<String> = feed.to_vec().iter().map(|s| s.id().to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_get_unknown_id() {
        let feed = SnapFeed::new();
        assert!(feed.is_empty());
        assert!(feed.get(&SnapId::new("missing")).is_none());
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let mut feed = SnapFeed::new();
        feed.append(snap("dup"));
        feed.append(snap("dup"));
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn test_seeded_feed() {
        let feed = SnapFeed::seeded(1_000_000_000);
        assert_eq!(feed.len(), 3);
        assert!(feed.get(&SnapId::new("3")).is_some());
    }
}
