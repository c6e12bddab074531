//! Browser-backed MapView adapter
//!
//! Marker operations are broadcast as `MarkerPlaced` / `MarkerRemoved`
//! events for the page's Leaflet map to mirror. Click handlers stay on the
//! server and are invoked when the page reports a marker click.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use wsr_common::events::{EventBus, WsrEvent};
use wsr_common::{GeoPoint, MapOptions, SnapId};

use super::{ClickHandler, MapError, MapView, MarkerHandle, MarkerIcon, MarkerSpec};

struct PlacedMarker {
    snap_id: SnapId,
    position: GeoPoint,
    icon: MarkerIcon,
    on_click: ClickHandler,
}

/// Marker snapshot for pages that connect after markers were placed
#[derive(Debug, Clone, Serialize)]
pub struct MarkerInfo {
    pub handle: MarkerHandle,
    pub snap_id: SnapId,
    pub latitude: f64,
    pub longitude: f64,
    pub icon: MarkerIcon,
}

pub struct EventMapView {
    bus: EventBus,
    ready: bool,
    options: Option<MapOptions>,
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, PlacedMarker>,
}

impl EventMapView {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            ready: false,
            options: None,
            next_handle: 1,
            markers: BTreeMap::new(),
        }
    }

    /// Record whether the page reports its map library as loaded
    pub fn set_ready(&mut self, ready: bool) {
        if self.ready != ready {
            debug!("Map library ready: {}", ready);
        }
        self.ready = ready;
    }

    pub fn options(&self) -> Option<&MapOptions> {
        self.options.as_ref()
    }

    pub fn markers(&self) -> Vec<MarkerInfo> {
        self.markers
            .iter()
            .map(|(handle, m)| MarkerInfo {
                handle: *handle,
                snap_id: m.snap_id.clone(),
                latitude: m.position.latitude(),
                longitude: m.position.longitude(),
                icon: m.icon.clone(),
            })
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Invoke the click handler of a marker; false if the handle is unknown
    pub fn click(&self, handle: MarkerHandle) -> bool {
        match self.markers.get(&handle) {
            Some(marker) => {
                debug!(handle = handle.raw(), snap_id = %marker.snap_id, "Marker clicked");
                (marker.on_click)();
                true
            }
            None => {
                warn!(handle = handle.raw(), "Click on unknown marker");
                false
            }
        }
    }
}

impl MapView for EventMapView {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn is_initialized(&self) -> bool {
        self.options.is_some()
    }

    fn init(&mut self, options: &MapOptions) -> Result<(), MapError> {
        if !self.ready {
            return Err(MapError::Unavailable);
        }

        info!(
            center = ?options.center,
            zoom = options.zoom,
            "Initializing map"
        );
        self.options = Some(options.clone());
        self.bus.emit_lossy(WsrEvent::MapInitialized {
            options: options.clone(),
            timestamp: wsr_common::time::now(),
        });
        Ok(())
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        let handle = MarkerHandle::new(self.next_handle);
        self.next_handle += 1;

        self.bus.emit_lossy(WsrEvent::MarkerPlaced {
            handle: handle.raw(),
            snap_id: spec.snap_id.clone(),
            latitude: spec.position.latitude(),
            longitude: spec.position.longitude(),
            timestamp: wsr_common::time::now(),
        });

        self.markers.insert(
            handle,
            PlacedMarker {
                snap_id: spec.snap_id,
                position: spec.position,
                icon: spec.icon,
                on_click: spec.on_click,
            },
        );
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> bool {
        if self.markers.remove(&handle).is_none() {
            return false;
        }
        self.bus.emit_lossy(WsrEvent::MarkerRemoved {
            handle: handle.raw(),
            timestamp: wsr_common::time::now(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn spec(id: &str, clicks: Arc<AtomicUsize>) -> MarkerSpec {
        MarkerSpec {
            snap_id: SnapId::new(id),
            position: GeoPoint::new(1.0, 2.0).unwrap(),
            icon: MarkerIcon::pulse(),
            on_click: Box::new(move || {
                clicks.fetch_add(1, Ordering::SeqCst);
            }),
        }
    }

    #[test]
    fn test_init_requires_ready() {
        let mut map = EventMapView::new(EventBus::new(8));
        assert_eq!(map.init(&MapOptions::default()), Err(MapError::Unavailable));
        assert!(!map.is_initialized());

        map.set_ready(true);
        assert!(map.init(&MapOptions::default()).is_ok());
        assert!(map.is_initialized());
    }

    #[test]
    fn test_handles_are_unique_and_click_routes_to_handler() {
        let mut map = EventMapView::new(EventBus::new(8));
        let clicks = Arc::new(AtomicUsize::new(0));

        let a = map.add_marker(spec("a", Arc::clone(&clicks)));
        let b = map.add_marker(spec("b", Arc::clone(&clicks)));
        assert_ne!(a, b);

        assert!(map.click(b));
        assert!(!map.click(MarkerHandle::new(999)));
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_marker_events_are_broadcast() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let mut map = EventMapView::new(bus);

        let handle = map.add_marker(spec("a", Arc::new(AtomicUsize::new(0))));
        assert!(map.remove_marker(handle));
        assert!(!map.remove_marker(handle));

        match rx.recv().await.unwrap() {
            WsrEvent::MarkerPlaced { handle: h, snap_id, .. } => {
                assert_eq!(h, handle.raw());
                assert_eq!(snap_id.as_str(), "a");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(rx.recv().await.unwrap(), WsrEvent::MarkerRemoved { .. }));
        assert_eq!(map.marker_count(), 0);
    }
}
