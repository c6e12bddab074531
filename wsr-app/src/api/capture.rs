//! Capture flow endpoints
//!
//! The page owns `getUserMedia`: it reports the permission outcome with
//! `open` and uploads the JPEG it grabbed from the video element with
//! `shutter`.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::debug;
use wsr_common::Snap;

use crate::capture::device::JPEG_MIME;
use crate::capture::CameraReport;
use crate::error::{ApiError, ApiResult};
use crate::shell::CaptureView;
use crate::AppState;

/// Upper bound for an uploaded still frame
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// False when sending is disabled (unknown location) or was superseded
    pub sent: bool,
    pub snap: Option<Snap>,
    pub capture: Option<CaptureView>,
}

#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub closed: bool,
}

async fn current_view(state: &AppState) -> Option<CaptureView> {
    state.shell.controller().lock().await.view().capture
}

async fn require_view(state: &AppState) -> ApiResult<Json<CaptureView>> {
    current_view(state)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::Conflict("no capture in progress".to_string()))
}

/// GET /api/capture
pub async fn get_capture(State(state): State<AppState>) -> Json<Option<CaptureView>> {
    Json(current_view(&state).await)
}

/// POST /api/capture/open - start a flow with the page's camera permission
pub async fn open_capture(
    State(state): State<AppState>,
    Json(report): Json<CameraReport>,
) -> ApiResult<Json<CaptureView>> {
    state.camera.report(report);
    state.shell.open_capture().await?;
    require_view(&state).await
}

/// POST /api/capture/shutter - body is the encoded still frame
pub async fn shutter(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<CaptureView>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty frame".to_string()));
    }

    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("image/"))
        .unwrap_or(JPEG_MIME);
    debug!(bytes = body.len(), %mime_type, "Frame uploaded");

    state.camera.push_frame(body.to_vec(), mime_type);
    state.shell.controller().lock().await.take_still()?;
    require_view(&state).await
}

/// POST /api/capture/retake
pub async fn retake(State(state): State<AppState>) -> ApiResult<Json<CaptureView>> {
    state.shell.controller().lock().await.retake()?;
    require_view(&state).await
}

/// POST /api/capture/send
pub async fn send(State(state): State<AppState>) -> ApiResult<Json<SendResponse>> {
    let snap = state.shell.send_capture().await?;
    Ok(Json(SendResponse {
        sent: snap.is_some(),
        snap: snap.map(|s| s.as_ref().clone()),
        capture: current_view(&state).await,
    }))
}

/// POST /api/capture/close
pub async fn close(State(state): State<AppState>) -> Json<CloseResponse> {
    Json(CloseResponse {
        closed: state.shell.controller().lock().await.close_capture(),
    })
}

pub fn capture_routes() -> Router<AppState> {
    Router::new()
        .route("/api/capture", get(get_capture))
        .route("/api/capture/open", post(open_capture))
        .route(
            "/api/capture/shutter",
            post(shutter).layer(DefaultBodyLimit::max(MAX_FRAME_BYTES)),
        )
        .route("/api/capture/retake", post(retake))
        .route("/api/capture/send", post(send))
        .route("/api/capture/close", post(close))
}
