//! Camera adapter for the browser page
//!
//! The page owns the physical camera (`getUserMedia`). It reports the
//! permission outcome before a flow opens the camera, and uploads the
//! frame it grabbed when the shutter is pressed. Frames are encoded by the
//! page at [`JPEG_QUALITY`](super::device::JPEG_QUALITY).

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::device::{Camera, CameraStream, DeviceError, StillImage};

/// Permission outcome reported by the page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraReport {
    pub granted: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Default)]
struct RelayState {
    report: Option<CameraReport>,
    frame: Option<(Vec<u8>, String)>,
    live_streams: usize,
    opened: usize,
}

#[derive(Clone, Default)]
pub struct RelayCamera {
    state: Arc<Mutex<RelayState>>,
}

impl RelayCamera {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        lock_state(&self.state)
    }

    /// Record the permission outcome for the next `open`
    pub fn report(&self, report: CameraReport) {
        debug!(granted = report.granted, "Camera permission reported");
        self.lock().report = Some(report);
    }

    /// Make a grabbed frame available to the live stream
    pub fn push_frame(&self, bytes: Vec<u8>, mime_type: &str) {
        let mut state = self.lock();
        if state.live_streams == 0 {
            warn!("Frame pushed with no live camera stream, ignoring");
            return;
        }
        state.frame = Some((bytes, mime_type.to_string()));
    }

    /// Streams opened and not yet stopped
    pub fn live_streams(&self) -> usize {
        self.lock().live_streams
    }

    /// Total successful acquisitions
    pub fn opened(&self) -> usize {
        self.lock().opened
    }
}

fn lock_state(state: &Mutex<RelayState>) -> MutexGuard<'_, RelayState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Camera for RelayCamera {
    async fn open(&self) -> Result<Box<dyn CameraStream>, DeviceError> {
        let mut state = self.lock();

        match state.report.take() {
            None => Err(DeviceError::Unavailable(
                "camera not reported by client".to_string(),
            )),
            Some(report) if !report.granted => {
                info!(
                    message = report.message.as_deref().unwrap_or(""),
                    "Camera access refused"
                );
                Err(DeviceError::PermissionDenied)
            }
            Some(_) => {
                state.opened += 1;
                state.live_streams += 1;
                state.frame = None;
                Ok(Box::new(RelayStream {
                    state: Arc::clone(&self.state),
                    stopped: false,
                }))
            }
        }
    }
}

struct RelayStream {
    state: Arc<Mutex<RelayState>>,
    stopped: bool,
}

impl CameraStream for RelayStream {
    fn capture_still(&mut self, quality: f32) -> Result<StillImage, DeviceError> {
        if self.stopped {
            return Err(DeviceError::Stopped);
        }
        let (bytes, mime_type) = lock_state(&self.state)
            .frame
            .take()
            .ok_or(DeviceError::NoFrame)?;
        Ok(StillImage::new(bytes, mime_type, quality))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let mut state = lock_state(&self.state);
        state.live_streams = state.live_streams.saturating_sub(1);
        state.frame = None;
    }
}
