//! wsr-app library interface
//!
//! World Snap Roulette: a single-session service owning the snap feed,
//! map markers and capture flow, rendered by a thin browser page over
//! REST + SSE.

pub mod api;
pub mod capture;
pub mod config;
pub mod error;
pub mod map;
pub mod services;
pub mod shell;

pub use crate::config::{AppConfig, Args};
pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use wsr_common::events::EventBus;

use crate::capture::{Camera, RelayCamera};
use crate::map::EventMapView;
use crate::services::{AiError, CaptionClient, GeminiModel, GenerativeModel, OfflineModel, SnapFeed};
use crate::shell::{AppController, Shell};

/// Event bus capacity per SSE subscriber
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Controller plus async runtime
    pub shell: Shell,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Browser camera relay
    pub camera: Arc<RelayCamera>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Assemble the shell with the seeded feed and the given model
    pub fn new(config: &AppConfig, model: Arc<dyn GenerativeModel>) -> Self {
        let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
        let map = EventMapView::new(event_bus.clone());
        let feed = SnapFeed::seeded(wsr_common::time::now_millis());
        let controller = AppController::new(event_bus.clone(), config.shell_settings(), map, feed);

        let camera = Arc::new(RelayCamera::new());
        let shell = Shell::new(
            controller,
            CaptionClient::new(model),
            Arc::clone(&camera) as Arc<dyn Camera>,
        );

        Self {
            shell,
            event_bus,
            camera,
            startup_time: Utc::now(),
        }
    }
}

/// Production model: Gemini when a key is configured, offline otherwise
pub fn build_model(config: &AppConfig) -> Result<Arc<dyn GenerativeModel>, AiError> {
    match &config.gemini_api_key {
        Some(key) => {
            let model = GeminiModel::new(key.clone(), config.gemini_model.clone())?;
            info!(model = %model.model(), "Using Gemini for captions");
            Ok(Arc::new(model))
        }
        None => Ok(Arc::new(OfflineModel)),
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::ui_routes())
        .merge(api::session_routes())
        .merge(api::snap_routes())
        .merge(api::map_routes())
        .merge(api::capture_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
