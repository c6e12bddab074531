//! Marker reconciliation
//!
//! Keeps the markers on a [`MapView`] in 1:1 correspondence with the snap
//! feed, keyed by snap identifier. Reconciliation is idempotent: a second
//! pass over an unchanged feed creates and removes nothing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use wsr_common::{Snap, SnapId};

use super::{MapView, MarkerHandle, MarkerIcon, MarkerSpec};
use crate::services::snap_feed::SnapFeed;

/// Receives the snap behind a clicked marker
pub type SelectionCallback = Arc<dyn Fn(Arc<Snap>) + Send + Sync>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub added: usize,
    pub removed: usize,
}

impl ReconcileStats {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

pub struct MarkerReconciler {
    markers: HashMap<SnapId, MarkerHandle>,
    on_select: SelectionCallback,
}

impl MarkerReconciler {
    pub fn new(on_select: SelectionCallback) -> Self {
        Self {
            markers: HashMap::new(),
            on_select,
        }
    }

    /// Sync the map's markers to `feed`
    ///
    /// No-op while the map is not initialized.
    pub fn reconcile(&mut self, feed: &SnapFeed, map: &mut dyn MapView) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        if !map.is_initialized() {
            debug!("Map not initialized, skipping marker reconciliation");
            return stats;
        }

        let current: HashSet<&SnapId> = feed.all().map(|s| s.id()).collect();

        // No snap is ever deleted today, but stale markers must not survive
        let stale: Vec<SnapId> = self
            .markers
            .keys()
            .filter(|id| !current.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(handle) = self.markers.remove(&id) {
                map.remove_marker(handle);
                stats.removed += 1;
            }
        }

        for snap in feed.all() {
            if self.markers.contains_key(snap.id()) {
                continue;
            }

            let selected = Arc::clone(snap);
            let on_select = Arc::clone(&self.on_select);
            let handle = map.add_marker(MarkerSpec {
                snap_id: snap.id().clone(),
                position: snap.position(),
                icon: MarkerIcon::pulse(),
                on_click: Box::new(move || on_select(Arc::clone(&selected))),
            });
            self.markers.insert(snap.id().clone(), handle);
            stats.added += 1;
        }

        if !stats.is_noop() {
            debug!(
                added = stats.added,
                removed = stats.removed,
                total = self.markers.len(),
                "Markers reconciled"
            );
        }
        stats
    }

    /// Remove every marker this reconciler placed
    pub fn clear(&mut self, map: &mut dyn MapView) -> usize {
        let removed = self.markers.len();
        for (_, handle) in self.markers.drain() {
            map.remove_marker(handle);
        }
        removed
    }

    pub fn handle_for(&self, id: &SnapId) -> Option<MarkerHandle> {
        self.markers.get(id).copied()
    }

    pub fn marker_ids(&self) -> HashSet<SnapId> {
        self.markers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
