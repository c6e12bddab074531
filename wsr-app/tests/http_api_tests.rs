//! HTTP API integration tests for wsr-app
//!
//! Drive the full router with `tower::ServiceExt::oneshot`; no socket is bound.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use wsr_app::services::caption_client::{CAPTION_ERROR_FALLBACK, PLACE_ERROR_FALLBACK};
use wsr_app::services::OfflineModel;
use wsr_app::{build_router, AppConfig, AppState};

/// Router over a seeded feed, an offline model and a silent simulator
fn test_app() -> Router {
    let config = AppConfig {
        inbound_probability: 0.0,
        map_ready_attempts: 2,
        map_ready_interval_ms: 10,
        ..Default::default()
    };
    build_router(AppState::new(&config, Arc::new(OfflineModel)))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn upload_frame(app: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/capture/shutter")
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(Body::from(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "wsr-app");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_root_serves_page() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("World Snap Roulette"));
    assert!(html.contains("/static/app.js"));
}

#[tokio::test]
async fn test_login_switches_view_to_main() {
    let app = test_app();

    let (_, view) = call(&app, Method::GET, "/api/view", None).await;
    assert_eq!(view["screen"], "Login");

    let (status, user) = call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Wereld Reiziger");

    let (_, view) = call(&app, Method::GET, "/api/view", None).await;
    assert_eq!(view["screen"], "Main");
    assert_eq!(view["feed_len"], 3);
    assert!(view["hint"].is_string());

    let (_, ended) = call(&app, Method::POST, "/api/session/logout", None).await;
    assert_eq!(ended["ended"], true);
    let (_, view) = call(&app, Method::GET, "/api/view", None).await;
    assert_eq!(view["screen"], "Login");
}

#[tokio::test]
async fn test_map_ready_places_markers_and_click_selects() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;

    let (status, ready) =
        call(&app, Method::POST, "/api/map/ready", Some(json!({ "ready": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["status"], "Ready");
    assert_eq!(ready["markers"], 3);

    let (_, markers) = call(&app, Method::GET, "/api/markers", None).await;
    assert!(markers["options"].is_object());
    let first = &markers["markers"][0];
    let handle = first["handle"].as_u64().unwrap();

    let (status, snap) = call(
        &app,
        Method::POST,
        &format!("/api/markers/{}/click", handle),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["id"], first["snap_id"]);

    let (_, view) = call(&app, Method::GET, "/api/view", None).await;
    assert_eq!(view["selected"]["id"], first["snap_id"]);

    let (_, dismissed) = call(&app, Method::DELETE, "/api/selection", None).await;
    assert_eq!(dismissed["dismissed"], true);
}

#[tokio::test]
async fn test_map_not_ready_stays_loading() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;

    let (_, ready) =
        call(&app, Method::POST, "/api/map/ready", Some(json!({ "ready": false }))).await;
    assert_eq!(ready["status"], "Loading");
    assert_eq!(ready["markers"], 0);
}

#[tokio::test]
async fn test_unknown_marker_and_snap_are_404() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;

    let (status, body) = call(&app, Method::POST, "/api/markers/999/click", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = call(&app, Method::POST, "/api/snaps/nope/select", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_capture_requires_session() {
    let app = test_app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/capture/open",
        Some(json!({ "granted": true })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_camera_denied_shows_error_state() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;

    let (status, view) = call(
        &app,
        Method::POST,
        "/api/capture/open",
        Some(json!({ "granted": false, "message": "NotAllowedError" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "Error");
    assert!(view["message"].is_string());

    let (_, closed) = call(&app, Method::POST, "/api/capture/close", None).await;
    assert_eq!(closed["closed"], true);
}

#[tokio::test]
async fn test_send_without_location_is_noop() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;

    let (_, view) = call(
        &app,
        Method::POST,
        "/api/capture/open",
        Some(json!({ "granted": true })),
    )
    .await;
    assert_eq!(view["state"], "Live");

    let (status, view) = upload_frame(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "Captured");
    assert_eq!(view["can_send"], false);

    let (_, sent) = call(&app, Method::POST, "/api/capture/send", None).await;
    assert_eq!(sent["sent"], false);
    assert_eq!(sent["capture"]["state"], "Captured");

    let (_, snaps) = call(&app, Method::GET, "/api/snaps", None).await;
    assert_eq!(snaps.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_send_with_location_appends_snap_with_fallbacks() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;

    let (status, location) = call(
        &app,
        Method::POST,
        "/api/session/location",
        Some(json!({ "latitude": 52.37, "longitude": 4.89 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(location["location"]["latitude"], 52.37);

    call(
        &app,
        Method::POST,
        "/api/capture/open",
        Some(json!({ "granted": true })),
    )
    .await;
    let (_, view) = upload_frame(&app).await;
    assert_eq!(view["can_send"], true);

    let (status, sent) = call(&app, Method::POST, "/api/capture/send", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["sent"], true);
    assert_eq!(sent["snap"]["caption"], CAPTION_ERROR_FALLBACK);
    assert_eq!(sent["snap"]["location_name"], PLACE_ERROR_FALLBACK);
    assert_eq!(sent["snap"]["sender_name"], "Wereld Reiziger");
    assert!(sent["snap"]["image_url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert_eq!(sent["capture"], Value::Null);

    let (_, snaps) = call(&app, Method::GET, "/api/snaps", None).await;
    assert_eq!(snaps.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_denied_location_keeps_unknown() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;

    let (status, location) = call(
        &app,
        Method::POST,
        "/api/session/location",
        Some(json!({ "error": "User denied Geolocation" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(location["location"], Value::Null);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/session/location",
        Some(json!({ "latitude": 123.0, "longitude": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_frame_rejected() {
    let app = test_app();
    call(&app, Method::POST, "/api/session/login", Some(json!({}))).await;
    call(
        &app,
        Method::POST,
        "/api/capture/open",
        Some(json!({ "granted": true })),
    )
    .await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/capture/shutter")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
