//! Map boundary endpoints
//!
//! The page reports when Leaflet is loaded and relays marker clicks; it
//! mirrors marker placement from the SSE stream, or from `GET /api/markers`
//! after a reconnect.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wsr_common::{MapOptions, Snap};

use crate::error::{ApiError, ApiResult};
use crate::map::{MarkerHandle, MarkerInfo};
use crate::shell::MapStatus;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MapReadyRequest {
    pub ready: bool,
}

#[derive(Debug, Serialize)]
pub struct MapReadyResponse {
    pub status: MapStatus,
    pub markers: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkersResponse {
    /// Present once the map is initialized
    pub options: Option<MapOptions>,
    pub markers: Vec<MarkerInfo>,
}

/// POST /api/map/ready
///
/// Polls readiness (bounded) and initializes the map once ready.
pub async fn map_ready(
    State(state): State<AppState>,
    Json(request): Json<MapReadyRequest>,
) -> Json<MapReadyResponse> {
    let status = state.shell.attach_map(request.ready).await;
    let markers = state.shell.controller().lock().await.marker_count();
    Json(MapReadyResponse { status, markers })
}

/// GET /api/markers
pub async fn list_markers(State(state): State<AppState>) -> Json<MarkersResponse> {
    let controller = state.shell.controller().lock().await;
    Json(MarkersResponse {
        options: controller.map().options().cloned(),
        markers: controller.map().markers(),
    })
}

/// POST /api/markers/:handle/click - select the marker's snap
pub async fn click_marker(
    State(state): State<AppState>,
    Path(handle): Path<u64>,
) -> ApiResult<Json<Snap>> {
    if !state.shell.click_marker(MarkerHandle::new(handle)).await {
        return Err(ApiError::NotFound(format!("marker {}", handle)));
    }

    let controller = state.shell.controller().lock().await;
    controller
        .selected()
        .map(|snap| Json(snap.as_ref().clone()))
        .ok_or_else(|| ApiError::Internal("marker click did not select a snap".to_string()))
}

pub fn map_routes() -> Router<AppState> {
    Router::new()
        .route("/api/map/ready", post(map_ready))
        .route("/api/markers", get(list_markers))
        .route("/api/markers/:handle/click", post(click_marker))
}
