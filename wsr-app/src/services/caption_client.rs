//! AI captioning client
//!
//! Two operations over a [`GenerativeModel`]: describe a photo and resolve
//! coordinates to a place name. Every failure is absorbed into a fixed
//! fallback string; callers never see an error. No retries, no caching.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};
use wsr_common::GeoPoint;

/// Output budget for the caption prompt
pub const MAX_OUTPUT_TOKENS: u32 = 60;

pub const CAPTION_PROMPT: &str = "Beschrijf kort wat er op deze foto staat in één korte, poëtische zin in het Nederlands. Noem de sfeer van de plek.";

pub const CAPTION_EMPTY_FALLBACK: &str = "Een prachtig moment ergens ter wereld.";
pub const CAPTION_ERROR_FALLBACK: &str = "Moment vastgelegd op de wereldkaart.";
pub const PLACE_EMPTY_FALLBACK: &str = "Onbekende Locatie";
pub const PLACE_ERROR_FALLBACK: &str = "Wereldlocatie";

/// Generative model transport errors
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No API key configured")]
    MissingApiKey,
}

/// One part of a multimodal prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Base64-encoded payload
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    /// Output budget; `None` leaves the model default
    pub max_output_tokens: Option<u32>,
}

/// Text generation capability
///
/// Returns the concatenated text of the first candidate; an empty string
/// means the model produced no text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, AiError>;
}

pub fn place_prompt(position: GeoPoint) -> String {
    format!(
        "Welke stad of regio hoort bij de coördinaten {}, {}? Antwoord met alleen de stad en het land in het Nederlands.",
        position.latitude(),
        position.longitude()
    )
}

#[derive(Clone)]
pub struct CaptionClient {
    model: Arc<dyn GenerativeModel>,
}

impl CaptionClient {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Short poetic Dutch caption for a photo
    pub async fn describe_image(&self, image: &[u8], mime_type: &str) -> String {
        let request = GenerateRequest {
            parts: vec![
                Part::InlineData {
                    mime_type: mime_type.to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(image),
                },
                Part::Text(CAPTION_PROMPT.to_string()),
            ],
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
        };

        match self.model.generate(request).await {
            Ok(text) if text.trim().is_empty() => {
                debug!("Caption model returned no text");
                CAPTION_EMPTY_FALLBACK.to_string()
            }
            Ok(text) => text,
            Err(e) => {
                warn!("Caption generation failed: {}", e);
                CAPTION_ERROR_FALLBACK.to_string()
            }
        }
    }

    /// "City, Country" in Dutch for a coordinate
    pub async fn resolve_place_name(&self, position: GeoPoint) -> String {
        let request = GenerateRequest {
            parts: vec![Part::Text(place_prompt(position))],
            max_output_tokens: None,
        };

        match self.model.generate(request).await {
            Ok(text) => {
                let place = text.trim();
                if place.is_empty() {
                    debug!(%position, "Place model returned no text");
                    PLACE_EMPTY_FALLBACK.to_string()
                } else {
                    place.to_string()
                }
            }
            Err(e) => {
                warn!(%position, "Place name lookup failed: {}", e);
                PLACE_ERROR_FALLBACK.to_string()
            }
        }
    }
}

/// Model used when no API key is configured
pub struct OfflineModel;

#[async_trait]
impl GenerativeModel for OfflineModel {
    async fn generate(&self, _request: GenerateRequest) -> Result<String, AiError> {
        Err(AiError::MissingApiKey)
    }
}
