//! Camera device boundary
//!
//! A [`Camera`] hands out [`CameraStream`]s; the capture flow holds its
//! stream in a [`StreamGuard`] so the device is released on every exit
//! path, including drop.

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;
use tracing::debug;

/// Encoding quality for still frames (0.0-1.0)
pub const JPEG_QUALITY: f32 = 0.8;

pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {0}")]
    Unavailable(String),

    #[error("no frame available from camera stream")]
    NoFrame,

    #[error("camera stream already stopped")]
    Stopped,
}

/// Encoded still frame
#[derive(Debug, Clone, PartialEq)]
pub struct StillImage {
    bytes: Vec<u8>,
    mime_type: String,
    quality: f32,
}

impl StillImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, quality: f32) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            quality: quality.clamp(0.0, 1.0),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// `data:` URL, used as the snap's image reference
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[async_trait]
pub trait Camera: Send + Sync {
    /// Acquire the device and start streaming
    async fn open(&self) -> Result<Box<dyn CameraStream>, DeviceError>;
}

pub trait CameraStream: Send {
    /// Extract a still frame from the live stream, encoded at `quality`
    fn capture_still(&mut self, quality: f32) -> Result<StillImage, DeviceError>;

    /// Release the device; must be idempotent
    fn stop(&mut self);
}

/// Owns a live stream and stops it when released or dropped
pub struct StreamGuard {
    stream: Option<Box<dyn CameraStream>>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn capture_still(&mut self, quality: f32) -> Result<StillImage, DeviceError> {
        match self.stream.as_mut() {
            Some(stream) => stream.capture_still(quality),
            None => Err(DeviceError::Stopped),
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Stop the stream now; later calls are no-ops
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!("Releasing camera stream");
            stream.stop();
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}
