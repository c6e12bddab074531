//! Domain models shared across WSR crates
//!
//! A [`Snap`] is immutable once built: fields are private and only readable
//! through accessors, and coordinates are validated by [`GeoPoint::new`]
//! before a snap can exist.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coordinate validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
}

/// WGS84 position in degrees
///
/// Invariant: latitude ∈ [-90, 90], longitude ∈ [-180, 180], both finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Clamp into range; non-finite components become 0
    pub fn clamped(latitude: f64, longitude: f64) -> Self {
        let clamp = |v: f64, bound: f64| if v.is_finite() { v.clamp(-bound, bound) } else { 0.0 };
        Self {
            latitude: clamp(latitude, 90.0),
            longitude: clamp(longitude, 180.0),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Opaque snap identifier, unique within a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapId(String);

impl SnapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh identifier backed by a UUIDv4
    pub fn generate() -> Self {
        Self(crate::uuid_utils::generate().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SnapId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single shared photo event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snap {
    id: SnapId,
    image_url: String,
    #[serde(flatten)]
    position: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    sender_name: String,
    /// Creation time, epoch milliseconds
    timestamp: i64,
}

impl Snap {
    pub fn new(
        id: SnapId,
        image_url: impl Into<String>,
        position: GeoPoint,
        sender_name: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            image_url: image_url.into(),
            position,
            location_name: None,
            caption: None,
            sender_name: sender_name.into(),
            timestamp,
        }
    }

    pub fn with_location_name(mut self, location_name: impl Into<String>) -> Self {
        self.location_name = Some(location_name.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn id(&self) -> &SnapId {
        &self.id
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn latitude(&self) -> f64 {
        self.position.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude()
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location_name.as_deref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Session user produced by the mock login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo_url: String,
}

impl User {
    pub const DEFAULT_NAME: &'static str = "Wereld Reiziger";
    pub const DEFAULT_EMAIL: &'static str = "reiziger@google.com";
    pub const DEFAULT_PHOTO_URL: &'static str = "https://picsum.photos/seed/user/100/100";

    /// Simulated sign-in; `name` overrides the default display name when non-blank
    pub fn mock(name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(Self::DEFAULT_NAME);

        Self {
            id: crate::uuid_utils::short_id(),
            name: name.to_string(),
            email: Self::DEFAULT_EMAIL.to_string(),
            photo_url: Self::DEFAULT_PHOTO_URL.to_string(),
        }
    }
}

/// Map initialization options passed to the rendering boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// `[latitude, longitude]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub tile_url: String,
    pub zoom_control: bool,
    pub attribution_control: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: [20.0, 0.0],
            zoom: 2.5,
            min_zoom: 2.0,
            max_zoom: 19.0,
            tile_url: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png".to_string(),
            zoom_control: false,
            attribution_control: false,
        }
    }
}
