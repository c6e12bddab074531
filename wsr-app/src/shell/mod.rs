//! Presentation shell
//!
//! [`AppController`] owns all application state and is mutated only through
//! its operations. [`Shell`] wraps it in a shared lock and runs the async
//! work (camera acquisition, AI calls, timers) without holding that lock.

pub mod controller;
pub mod runtime;

pub use controller::AppController;
pub use runtime::{Shell, SharedController};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use wsr_common::{GeoPoint, MapOptions, Snap, User};

use crate::capture::{CaptureError, CaptureState, FlowId};
use crate::map::ReadinessPolicy;

/// Onboarding hint shown while the feed is small
pub const ONBOARDING_HINT: &str = "Klik om jouw wereld te delen 🌍";

/// Hint is visible while the feed holds at most this many snaps
pub const ONBOARDING_HINT_MAX_SNAPS: usize = 4;

/// Sender name for snaps submitted without a session user
pub const ANONYMOUS_SENDER: &str = "Anoniem";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    Login,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MapStatus {
    /// Map library not ready yet; loading indicator shown
    Loading,
    Ready,
}

/// Events produced by user interaction and timers, drained by the controller
#[derive(Debug, Clone)]
pub enum UiEvent {
    SnapSelected(Arc<Snap>),
    SnapSubmitted(Snap),
    NotificationDismissed(u64),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no active session")]
    NoSession,

    #[error("unknown snap: {0}")]
    UnknownSnap(String),

    #[error("no capture in progress")]
    NoCaptureFlow,

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Timings and options the shell runs with
#[derive(Debug, Clone)]
pub struct ShellSettings {
    pub map: MapOptions,
    pub readiness: ReadinessPolicy,
    pub inbound_interval: Duration,
    pub inbound_probability: f64,
    pub notification: Duration,
    pub own_snap_reveal: Duration,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            map: MapOptions::default(),
            readiness: ReadinessPolicy::default(),
            inbound_interval: Duration::from_secs(15),
            inbound_probability: 0.2,
            notification: Duration::from_secs(5),
            own_snap_reveal: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationView {
    pub id: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureView {
    pub flow_id: FlowId,
    #[serde(flatten)]
    pub state: CaptureState,
    /// Send is only enabled with a known location
    pub can_send: bool,
}

/// Everything the page needs to render the current screen
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub screen: Screen,
    pub user: Option<User>,
    pub feed_len: usize,
    pub selected: Option<Snap>,
    pub notification: Option<NotificationView>,
    pub hint: Option<&'static str>,
    pub map_status: MapStatus,
    pub markers: usize,
    pub location: Option<GeoPoint>,
    pub capture: Option<CaptureView>,
}
