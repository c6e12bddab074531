//! Configuration resolution for wsr-app
//!
//! **Priority:** CLI (with `WSR_*` env fallbacks via clap) → TOML file →
//! compiled defaults. The Gemini API key additionally falls back to the
//! `API_KEY` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};
use wsr_common::config::{env_var, load_toml, resolve_config_path};
use wsr_common::{Error, MapOptions, Result};

use crate::map::ReadinessPolicy;
use crate::services::gemini::DEFAULT_MODEL;
use crate::shell::ShellSettings;

pub const CONFIG_FILE_NAME: &str = "wsr-app.toml";
pub const DEFAULT_PORT: u16 = 5780;

/// Command-line arguments for wsr-app
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "wsr-app")]
#[command(about = "World Snap Roulette: share snaps on a world map")]
#[command(version)]
pub struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "WSR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "WSR_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WSR_PORT")]
    pub port: Option<u16>,

    /// Gemini API key (falls back to API_KEY)
    #[arg(long, env = "WSR_GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "WSR_GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Seconds between inbound simulator ticks
    #[arg(long, env = "WSR_INBOUND_INTERVAL_SECS")]
    pub inbound_interval_secs: Option<u64>,

    /// Probability of an inbound snap per tick (0.0-1.0)
    #[arg(long, env = "WSR_INBOUND_PROBABILITY")]
    pub inbound_probability: Option<f64>,
}

/// TOML file contents; every key optional
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub inbound_interval_secs: Option<u64>,
    pub inbound_probability: Option<f64>,
    pub notification_secs: Option<u64>,
    pub own_snap_reveal_ms: Option<u64>,
    pub map_ready_attempts: Option<u32>,
    pub map_ready_interval_ms: Option<u64>,
    pub map: Option<MapOptions>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub inbound_interval_secs: u64,
    pub inbound_probability: f64,
    pub notification_secs: u64,
    pub own_snap_reveal_ms: u64,
    pub map_ready_attempts: u32,
    pub map_ready_interval_ms: u64,
    pub map: MapOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            inbound_interval_secs: 15,
            inbound_probability: 0.2,
            notification_secs: 5,
            own_snap_reveal_ms: 500,
            map_ready_attempts: 20,
            map_ready_interval_ms: 250,
            map: MapOptions::default(),
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

impl AppConfig {
    /// Resolve from CLI/env, the config file and defaults
    pub fn resolve(args: &Args) -> Result<Self> {
        let path = resolve_config_path(args.config.as_deref(), "WSR_CONFIG", CONFIG_FILE_NAME);
        let file: FileConfig = load_toml(path.as_deref())?;
        let fallback_key = env_var::<String>("API_KEY")?;
        Self::merge(args, file, fallback_key)
    }

    /// Combine already-loaded sources; CLI wins over file, file over defaults
    pub fn merge(args: &Args, file: FileConfig, fallback_key: Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let gemini_api_key = args
            .gemini_api_key
            .clone()
            .filter(|k| is_valid_key(k))
            .or(file.gemini_api_key.filter(|k| is_valid_key(k)))
            .or(fallback_key.filter(|k| is_valid_key(k)));

        let config = Self {
            host: args.host.clone().or(file.host).unwrap_or(defaults.host),
            port: args.port.or(file.port).unwrap_or(defaults.port),
            gemini_api_key,
            gemini_model: args
                .gemini_model
                .clone()
                .or(file.gemini_model)
                .unwrap_or(defaults.gemini_model),
            inbound_interval_secs: args
                .inbound_interval_secs
                .or(file.inbound_interval_secs)
                .unwrap_or(defaults.inbound_interval_secs),
            inbound_probability: args
                .inbound_probability
                .or(file.inbound_probability)
                .unwrap_or(defaults.inbound_probability),
            notification_secs: file.notification_secs.unwrap_or(defaults.notification_secs),
            own_snap_reveal_ms: file.own_snap_reveal_ms.unwrap_or(defaults.own_snap_reveal_ms),
            map_ready_attempts: file.map_ready_attempts.unwrap_or(defaults.map_ready_attempts),
            map_ready_interval_ms: file
                .map_ready_interval_ms
                .unwrap_or(defaults.map_ready_interval_ms),
            map: file.map.unwrap_or(defaults.map),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.inbound_probability) {
            return Err(Error::Config(format!(
                "inbound_probability must be within 0.0-1.0, got {}",
                self.inbound_probability
            )));
        }
        if self.inbound_interval_secs == 0 {
            return Err(Error::Config("inbound_interval_secs must be positive".to_string()));
        }
        if self.map_ready_attempts == 0 {
            return Err(Error::Config("map_ready_attempts must be positive".to_string()));
        }
        if self.map.min_zoom > self.map.max_zoom {
            return Err(Error::Config(format!(
                "map.min_zoom ({}) exceeds map.max_zoom ({})",
                self.map.min_zoom, self.map.max_zoom
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shell_settings(&self) -> ShellSettings {
        ShellSettings {
            map: self.map.clone(),
            readiness: ReadinessPolicy {
                attempts: self.map_ready_attempts,
                interval: Duration::from_millis(self.map_ready_interval_ms),
            },
            inbound_interval: Duration::from_secs(self.inbound_interval_secs),
            inbound_probability: self.inbound_probability,
            notification: Duration::from_secs(self.notification_secs),
            own_snap_reveal: Duration::from_millis(self.own_snap_reveal_ms),
        }
    }

    /// Log the effective configuration (API key redacted)
    pub fn log_summary(&self) {
        info!(
            bind = %self.bind_addr(),
            model = %self.gemini_model,
            inbound_interval_secs = self.inbound_interval_secs,
            inbound_probability = self.inbound_probability,
            "Configuration resolved"
        );
        if self.gemini_api_key.is_none() {
            warn!("No Gemini API key configured; captions and place names use fallback text");
        }
    }
}
