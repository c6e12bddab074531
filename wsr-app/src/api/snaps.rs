//! Feed, selection and notification endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wsr_common::{Snap, SnapId};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub dismissed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DismissNotificationRequest {
    /// Only dismiss this notification; any notification when absent
    #[serde(default)]
    pub id: Option<u64>,
}

/// GET /api/snaps - feed, newest first
pub async fn list_snaps(State(state): State<AppState>) -> Json<Vec<Snap>> {
    Json(state.shell.controller().lock().await.snaps())
}

/// POST /api/snaps/:id/select - open the preview modal
pub async fn select_snap(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Snap>> {
    let snap = state
        .shell
        .controller()
        .lock()
        .await
        .select(&SnapId::new(id))?;
    Ok(Json(snap.as_ref().clone()))
}

/// DELETE /api/selection - close the preview modal
pub async fn dismiss_selection(State(state): State<AppState>) -> Json<DismissResponse> {
    Json(DismissResponse {
        dismissed: state.shell.controller().lock().await.dismiss_selection(),
    })
}

/// POST /api/notification/dismiss
pub async fn dismiss_notification(
    State(state): State<AppState>,
    body: Option<Json<DismissNotificationRequest>>,
) -> Json<DismissResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    Json(DismissResponse {
        dismissed: state
            .shell
            .controller()
            .lock()
            .await
            .dismiss_notification(request.id),
    })
}

pub fn snap_routes() -> Router<AppState> {
    Router::new()
        .route("/api/snaps", get(list_snaps))
        .route("/api/snaps/:id/select", post(select_snap))
        .route("/api/selection", delete(dismiss_selection))
        .route("/api/notification/dismiss", post(dismiss_notification))
}
