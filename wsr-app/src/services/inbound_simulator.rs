//! Simulated snaps from other users
//!
//! Each tick rolls against a probability; a hit produces a snap at a random
//! position between latitudes -70 and 70.

use rand::Rng;
use wsr_common::{GeoPoint, Snap, SnapId};

pub const SENDER_NAMES: [&str; 7] = ["Lukas", "Elena", "Mateo", "Yuki", "Sienna", "Aarav", "Amara"];

pub const CAPTIONS: [&str; 5] = [
    "Prachtige ochtend hier.",
    "De sfeer is magisch vandaag.",
    "Even genieten van het uitzicht.",
    "Groeten uit de verte!",
    "Wat een bijzondere plek is dit.",
];

pub const INBOUND_LOCATION_NAME: &str = "Ergens op de wereld";

pub const LATITUDE_BAND: f64 = 70.0;

pub fn notification_message(sender: &str) -> String {
    format!("Nieuwe snap ontvangen van {}!", sender)
}

#[derive(Debug, Clone, Copy)]
pub struct InboundGenerator {
    probability: f64,
}

impl Default for InboundGenerator {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl InboundGenerator {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// One tick: `Some(snap)` on a hit
    pub fn roll<R: Rng>(&self, rng: &mut R, now_ms: i64) -> Option<Snap> {
        if rng.gen::<f64>() < self.probability {
            Some(generate_snap(rng, now_ms))
        } else {
            None
        }
    }
}

pub fn generate_snap<R: Rng>(rng: &mut R, now_ms: i64) -> Snap {
    let latitude = rng.gen_range(-LATITUDE_BAND..LATITUDE_BAND);
    let longitude = rng.gen_range(-180.0..180.0);
    let sender = SENDER_NAMES[rng.gen_range(0..SENDER_NAMES.len())];
    let caption = CAPTIONS[rng.gen_range(0..CAPTIONS.len())];
    let seed: u32 = rng.gen();

    Snap::new(
        SnapId::generate(),
        format!("https://picsum.photos/seed/{}/800/600", seed),
        GeoPoint::clamped(latitude, longitude),
        sender,
        now_ms,
    )
    .with_location_name(INBOUND_LOCATION_NAME)
    .with_caption(caption)
}
