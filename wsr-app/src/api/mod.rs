//! HTTP API handlers for wsr-app

pub mod capture;
pub mod health;
pub mod map;
pub mod session;
pub mod snaps;
pub mod sse;
pub mod ui;

pub use capture::capture_routes;
pub use health::health_routes;
pub use map::map_routes;
pub use session::session_routes;
pub use snaps::snap_routes;
pub use sse::event_stream;
pub use ui::ui_routes;
