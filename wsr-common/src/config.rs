//! Configuration file resolution and TOML loading
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`~/.config/wsr/<file>`, then `/etc/wsr/<file>`)
//! 4. None: compiled defaults only

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Locate the TOML config file for a module
///
/// An explicit path (CLI or env) is returned even if it does not exist, so
/// that loading reports the missing file instead of silently using defaults.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_candidates(file_name)
        .into_iter()
        .find(|p| p.exists())
}

/// Platform config locations, most specific first
fn default_config_candidates(file_name: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("wsr").join(file_name));
    }
    if cfg!(unix) {
        candidates.push(PathBuf::from("/etc/wsr").join(file_name));
    }
    candidates
}

/// Load a TOML config file, or defaults when no file is given
pub fn load_toml<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        debug!("No config file found, using defaults");
        return Ok(T::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file {}", path.display());
    Ok(config)
}

/// Read and parse an environment variable
///
/// Unset or blank variables yield `Ok(None)`; unparsable values are a
/// configuration error.
pub fn env_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid {} value: {}", name, e))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serial_test::serial;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        port: u16,
        name: Option<String>,
    }

    #[test]
    fn test_cli_path_wins() {
        let path = PathBuf::from("/tmp/explicit.toml");
        let resolved = resolve_config_path(Some(&path), "WSR_TEST_UNUSED_CONFIG", "x.toml");
        assert_eq!(resolved, Some(path));
    }

    #[test]
    #[serial]
    fn test_env_path_used_without_cli() {
        std::env::set_var("WSR_TEST_CONFIG_PATH", "/tmp/from-env.toml");
        let resolved = resolve_config_path(None, "WSR_TEST_CONFIG_PATH", "x.toml");
        std::env::remove_var("WSR_TEST_CONFIG_PATH");
        assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));
    }

    #[test]
    fn test_load_toml_without_path_gives_defaults() {
        let sample: Sample = load_toml(None).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_load_toml_parses_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 6000\nname = \"demo\"").unwrap();

        let sample: Sample = load_toml(Some(file.path())).unwrap();
        assert_eq!(sample.port, 6000);
        assert_eq!(sample.name.as_deref(), Some("demo"));
    }

    #[test]
    fn test_load_toml_reports_missing_file() {
        let result: Result<Sample> = load_toml(Some(Path::new("/nonexistent/wsr.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_env_var_parsing() {
        std::env::set_var("WSR_TEST_PORT", " 5781 ");
        assert_eq!(env_var::<u16>("WSR_TEST_PORT").unwrap(), Some(5781));

        std::env::set_var("WSR_TEST_PORT", "not-a-port");
        assert!(env_var::<u16>("WSR_TEST_PORT").is_err());

        std::env::remove_var("WSR_TEST_PORT");
        assert_eq!(env_var::<u16>("WSR_TEST_PORT").unwrap(), None);
    }
}
