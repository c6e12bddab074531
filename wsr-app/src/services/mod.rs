//! Service modules: feed state, AI captioning, timers and inbound simulation

pub mod caption_client;
pub mod gemini;
pub mod inbound_simulator;
pub mod scheduled_task;
pub mod seed;
pub mod snap_feed;

pub use caption_client::{
    AiError, CaptionClient, GenerateRequest, GenerativeModel, OfflineModel, Part,
};
pub use gemini::GeminiModel;
pub use inbound_simulator::InboundGenerator;
pub use scheduled_task::ScheduledTask;
pub use snap_feed::SnapFeed;
