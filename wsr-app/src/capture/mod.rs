//! Capture flow state machine
//!
//! ```text
//! Idle ──open ok──▶ Live ──take_still──▶ Captured ──begin_send──▶ Sending ──complete──▶ Closed
//!   │                 ▲                     │
//!   └─open failed─▶ Error      └──retake────┘
//! ```
//!
//! `close` is valid from every state. The camera stream lives in a
//! [`StreamGuard`], so leaving `Live`/`Captured`/`Sending` by any route
//! (including dropping the flow) releases the device.

pub mod device;
pub mod relay_camera;

pub use device::{Camera, CameraStream, DeviceError, StillImage, StreamGuard, JPEG_QUALITY};
pub use relay_camera::{CameraReport, RelayCamera};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wsr_common::GeoPoint;

/// Identifies one capture flow; late results for an old flow are dropped
pub type FlowId = Uuid;

/// User-facing message for an unavailable camera
pub const CAMERA_ERROR_MESSAGE: &str =
    "Kan geen toegang krijgen tot de camera. Controleer je instellingen.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message")]
pub enum CaptureState {
    /// Camera not yet acquired
    Idle,
    /// Camera streaming, no still frame
    Live,
    /// Still frame taken, not sent
    Captured,
    /// Caption and place-name lookups in flight
    Sending,
    /// Flow finished or dismissed
    Closed,
    /// Camera unavailable; the only way out is `close`
    Error(String),
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "Idle",
            CaptureState::Live => "Live",
            CaptureState::Captured => "Captured",
            CaptureState::Sending => "Sending",
            CaptureState::Closed => "Closed",
            CaptureState::Error(_) => "Error",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CaptureState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CaptureState::Closed | CaptureState::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    #[error("cannot {action} while capture is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Work handed to the caption service when a send starts
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub flow_id: FlowId,
    pub image: StillImage,
    pub position: GeoPoint,
}

pub struct CaptureFlow {
    id: FlowId,
    state: CaptureState,
    stream: Option<StreamGuard>,
    still: Option<StillImage>,
}

impl Default for CaptureFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: CaptureState::Idle,
            stream: None,
            still: None,
        }
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn still(&self) -> Option<&StillImage> {
        self.still.as_ref()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.as_ref().is_some_and(StreamGuard::is_active)
    }

    fn invalid(&self, action: &'static str) -> CaptureError {
        CaptureError::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    fn transition(&mut self, next: CaptureState) {
        debug!(flow_id = %self.id, from = self.state.name(), to = next.name(), "Capture transition");
        self.state = next;
    }

    /// Apply the outcome of a camera acquisition (`Idle` only)
    ///
    /// A stream delivered to a flow that is no longer `Idle` is released
    /// immediately.
    pub fn camera_opened(
        &mut self,
        result: Result<Box<dyn CameraStream>, DeviceError>,
    ) -> Result<(), CaptureError> {
        if self.state != CaptureState::Idle {
            // Dropping the guard stops the late stream
            drop(result.map(StreamGuard::new));
            return Err(self.invalid("open camera"));
        }

        match result {
            Ok(stream) => {
                self.stream = Some(StreamGuard::new(stream));
                self.transition(CaptureState::Live);
            }
            Err(e) => {
                warn!(flow_id = %self.id, "Camera acquisition failed: {}", e);
                self.transition(CaptureState::Error(CAMERA_ERROR_MESSAGE.to_string()));
            }
        }
        Ok(())
    }

    /// Acquire `camera` and apply the result
    pub async fn start(&mut self, camera: &dyn Camera) -> Result<(), CaptureError> {
        if self.state != CaptureState::Idle {
            return Err(self.invalid("open camera"));
        }
        let result = camera.open().await;
        self.camera_opened(result)
    }

    /// `Live → Captured`
    pub fn take_still(&mut self) -> Result<(), CaptureError> {
        if self.state != CaptureState::Live {
            return Err(self.invalid("take a photo"));
        }
        let stream = self.stream.as_mut().ok_or(DeviceError::Stopped)?;
        let still = stream.capture_still(JPEG_QUALITY)?;

        self.still = Some(still);
        self.transition(CaptureState::Captured);
        Ok(())
    }

    /// `Captured → Live`, reusing the already acquired stream
    pub fn retake(&mut self) -> Result<(), CaptureError> {
        if self.state != CaptureState::Captured {
            return Err(self.invalid("retake"));
        }
        self.still = None;
        self.transition(CaptureState::Live);
        Ok(())
    }

    /// `Captured → Sending` when the device location is known
    ///
    /// Without a location the send is disabled: `Ok(None)` and no
    /// transition.
    pub fn begin_send(
        &mut self,
        location: Option<GeoPoint>,
    ) -> Result<Option<PendingSend>, CaptureError> {
        if self.state != CaptureState::Captured {
            return Err(self.invalid("send"));
        }
        let (Some(position), Some(image)) = (location, self.still.clone()) else {
            debug!(flow_id = %self.id, "Send ignored: device location unknown");
            return Ok(None);
        };

        self.transition(CaptureState::Sending);
        Ok(Some(PendingSend {
            flow_id: self.id,
            image,
            position,
        }))
    }

    /// `Sending → Closed`; returns the image that was sent
    pub fn complete_send(&mut self) -> Result<StillImage, CaptureError> {
        if self.state != CaptureState::Sending {
            return Err(self.invalid("complete send"));
        }
        let image = self.still.take().ok_or_else(|| self.invalid("complete send"))?;
        self.release();
        self.transition(CaptureState::Closed);
        info!(flow_id = %self.id, "Capture sent");
        Ok(image)
    }

    /// Leave the flow from any state
    pub fn close(&mut self) {
        self.release();
        self.still = None;
        if self.state != CaptureState::Closed {
            self.transition(CaptureState::Closed);
        }
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }
}
