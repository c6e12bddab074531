//! Map rendering boundary
//!
//! The [`MapView`] capability is all the marker reconciler depends on.
//! [`EventMapView`] adapts it to the browser's Leaflet map.

pub mod event_map;
pub mod readiness;
pub mod reconciler;

pub use event_map::{EventMapView, MarkerInfo};
pub use readiness::{wait_until_ready, ReadinessPolicy};
pub use reconciler::{MarkerReconciler, ReconcileStats, SelectionCallback};

use serde::Serialize;
use thiserror::Error;
use wsr_common::{GeoPoint, MapOptions, SnapId};

/// Map boundary errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("map library not ready after {attempts} attempts")]
    NotReady { attempts: u32 },

    #[error("map library not loaded")]
    Unavailable,
}

/// Opaque handle to a marker created by a [`MapView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Custom marker visual (Leaflet `divIcon`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerIcon {
    pub class_name: &'static str,
    pub html: &'static str,
    pub size: [u32; 2],
    pub anchor: [u32; 2],
}

impl MarkerIcon {
    /// Pulsing dot used for every snap
    pub fn pulse() -> Self {
        Self {
            class_name: "custom-marker",
            html: r#"<div class="marker-pulse"></div>"#,
            size: [24, 24],
            anchor: [12, 12],
        }
    }
}

pub type ClickHandler = Box<dyn Fn() + Send + Sync>;

/// Everything needed to place one marker
pub struct MarkerSpec {
    pub snap_id: SnapId,
    pub position: GeoPoint,
    pub icon: MarkerIcon,
    pub on_click: ClickHandler,
}

impl std::fmt::Debug for MarkerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerSpec")
            .field("snap_id", &self.snap_id)
            .field("position", &self.position)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// Map capability consumed by the marker reconciler
pub trait MapView: Send {
    /// Whether the underlying map library is loaded and usable
    fn is_ready(&self) -> bool;

    /// Whether `init` has completed
    fn is_initialized(&self) -> bool;

    /// Create the map with center/zoom/style options
    fn init(&mut self, options: &MapOptions) -> Result<(), MapError>;

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle;

    /// Returns false if the handle is unknown
    fn remove_marker(&mut self, handle: MarkerHandle) -> bool;
}
