//! Session endpoints: login, logout, device location and the view snapshot

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use wsr_common::{GeoPoint, User};

use crate::error::ApiResult;
use crate::shell::ViewSnapshot;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Display name override
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub ended: bool,
}

/// Geolocation outcome reported by the page
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationReport {
    Position { latitude: f64, longitude: f64 },
    Denied { error: String },
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: Option<GeoPoint>,
}

/// GET /api/view
pub async fn get_view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.shell.controller().lock().await.view())
}

/// POST /api/session/login
pub async fn login(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Json<User> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    Json(state.shell.login(request.name.as_deref()).await)
}

/// POST /api/session/logout
pub async fn logout(State(state): State<AppState>) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        ended: state.shell.logout().await,
    })
}

/// POST /api/session/location
///
/// A denial leaves the location unknown; capture can still run but sending
/// stays disabled.
pub async fn report_location(
    State(state): State<AppState>,
    Json(report): Json<LocationReport>,
) -> ApiResult<Json<LocationResponse>> {
    match report {
        LocationReport::Position {
            latitude,
            longitude,
        } => {
            let position = GeoPoint::new(latitude, longitude)?;
            state.shell.set_location(position).await;
        }
        LocationReport::Denied { error } => {
            warn!("Location access denied: {}", error);
        }
    }

    Ok(Json(LocationResponse {
        location: state.shell.controller().lock().await.location(),
    }))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/view", get(get_view))
        .route("/api/session/login", post(login))
        .route("/api/session/logout", post(logout))
        .route("/api/session/location", post(report_location))
}
