//! # World Snap Roulette Common Library
//!
//! Shared code for the World Snap Roulette service:
//! - Domain models (Snap, User, GeoPoint, MapOptions)
//! - Event types (WsrEvent enum) and the EventBus
//! - Configuration file resolution
//! - SSE helpers
//! - Time and identifier utilities

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use models::{GeoError, GeoPoint, MapOptions, Snap, SnapId, User};
