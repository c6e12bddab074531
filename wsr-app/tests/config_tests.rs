//! Config file and environment resolution
//!
//! These mutate process environment, so every test is `#[serial]`.

use std::io::Write;

use clap::Parser;
use serial_test::serial;
use tempfile::NamedTempFile;

use wsr_app::{AppConfig, Args};

const ENV_VARS: &[&str] = &[
    "API_KEY",
    "WSR_CONFIG",
    "WSR_HOST",
    "WSR_PORT",
    "WSR_GEMINI_API_KEY",
    "WSR_GEMINI_MODEL",
    "WSR_INBOUND_INTERVAL_SECS",
    "WSR_INBOUND_PROBABILITY",
];

fn clear_env() {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_config_file_values_applied() {
    clear_env();
    let file = write_config(
        r#"
port = 6100
inbound_probability = 0.5
notification_secs = 3

[map]
center = [10.0, 20.0]
zoom = 3.0
min_zoom = 2.0
max_zoom = 12.0
tile_url = "https://tiles.example/{z}/{x}/{y}.png"
zoom_control = true
attribution_control = true
"#,
    );
    let path = file.path().to_str().unwrap();

    let args = Args::parse_from(["wsr-app", "--config", path]);
    let config = AppConfig::resolve(&args).unwrap();

    assert_eq!(config.port, 6100);
    assert_eq!(config.inbound_probability, 0.5);
    assert_eq!(config.notification_secs, 3);
    assert_eq!(config.map.zoom, 3.0);
    assert_eq!(config.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_cli_beats_config_file() {
    clear_env();
    let file = write_config("port = 6100\nhost = \"0.0.0.0\"\n");
    let path = file.path().to_str().unwrap();

    let args = Args::parse_from(["wsr-app", "--config", path, "--port", "7000"]);
    let config = AppConfig::resolve(&args).unwrap();

    assert_eq!(config.port, 7000);
    assert_eq!(config.host, "0.0.0.0");
}

#[test]
#[serial]
fn test_api_key_env_fallback() {
    clear_env();
    let file = write_config("");
    let path = file.path().to_str().unwrap();

    std::env::set_var("API_KEY", "env-key");
    let args = Args::parse_from(["wsr-app", "--config", path]);
    let config = AppConfig::resolve(&args).unwrap();
    assert_eq!(config.gemini_api_key.as_deref(), Some("env-key"));

    std::env::set_var("WSR_GEMINI_API_KEY", "wsr-key");
    let args = Args::parse_from(["wsr-app", "--config", path]);
    let config = AppConfig::resolve(&args).unwrap();
    assert_eq!(config.gemini_api_key.as_deref(), Some("wsr-key"));

    clear_env();
}

#[test]
#[serial]
fn test_missing_config_file_is_error() {
    clear_env();
    let args = Args::parse_from(["wsr-app", "--config", "/nonexistent/wsr-app.toml"]);
    assert!(AppConfig::resolve(&args).is_err());
}

#[test]
#[serial]
fn test_malformed_config_file_is_error() {
    clear_env();
    let file = write_config("port = \"not a number\"");
    let path = file.path().to_str().unwrap();

    let args = Args::parse_from(["wsr-app", "--config", path]);
    assert!(AppConfig::resolve(&args).is_err());
}
