//! Configuration: optional JSON file in the config directory, then environment overrides.
//!
//! - `CHAT_SEGMENTS_DISABLED`: 1 or true to turn splitting off
//! - `CHAT_SEGMENTS_MEDIA_HOSTS`: comma separated media host path fragments
//! - `CHAT_SEGMENTS_WIDTH`: bubble width for `--format bubbles`

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::paths;
use crate::core::segment::SegmentOptions;

/// Default bubble width in columns.
pub const DEFAULT_WIDTH: usize = 72;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub segment: SegmentOptions,
    pub width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment: SegmentOptions::default(),
            width: DEFAULT_WIDTH,
        }
    }
}

/// Error loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON in config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// JSON structure on disk. Every field is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    enabled: Option<bool>,
    media_hosts: Option<Vec<String>>,
    width: Option<usize>,
}

/// Load configuration from the config file (if present) and the environment.
pub fn load() -> Result<Config, ConfigError> {
    let file = paths::config_file();
    load_with(file.as_deref(), |key| std::env::var(key).ok())
}

/// Load from `path` (missing file is fine) and overrides looked up through `env`.
pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::default();

    if let Some(path) = path
        && path.exists()
    {
        let content = fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&content)?;
        log::debug!("loaded config from {}", path.display());
        if let Some(enabled) = file.enabled {
            config.segment.enabled = enabled;
        }
        if let Some(hosts) = file.media_hosts {
            config.segment.media_hosts = hosts;
        }
        if let Some(width) = file.width {
            config.width = width;
        }
    }

    if let Some(v) = env("CHAT_SEGMENTS_DISABLED") {
        config.segment.enabled = !(v == "1" || v.eq_ignore_ascii_case("true"));
    }
    if let Some(v) = env("CHAT_SEGMENTS_MEDIA_HOSTS") {
        config.segment.media_hosts = v
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
    }
    if let Some(v) = env("CHAT_SEGMENTS_WIDTH") {
        config.width = v.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("CHAT_SEGMENTS_WIDTH must be a number, got '{}'", v))
        })?;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.width == 0 {
        return Err(ConfigError::Validation("width must be greater than 0".to_string()));
    }
    for host in &config.segment.media_hosts {
        if host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "media_hosts entries cannot be empty".to_string(),
            ));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "media host '{}' must not contain whitespace",
                host
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_file() {
        let config = load_with(None, no_env).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.segment.enabled);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_with(Some(&tmp.path().join("nope.json")), no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_apply() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"enabled": false, "media_hosts": ["cdn.test/media/"], "width": 40}"#,
        )
        .unwrap();
        let config = load_with(Some(&path), no_env).unwrap();
        assert!(!config.segment.enabled);
        assert_eq!(config.segment.media_hosts, vec!["cdn.test/media/"]);
        assert_eq!(config.width, 40);
    }

    #[test]
    fn env_overrides_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"width": 40}"#).unwrap();
        let config = load_with(Some(&path), |key| match key {
            "CHAT_SEGMENTS_WIDTH" => Some("90".to_string()),
            "CHAT_SEGMENTS_MEDIA_HOSTS" => Some(" a.test/img/ , ,b.test/v/".to_string()),
            "CHAT_SEGMENTS_DISABLED" => Some("TRUE".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.width, 90);
        assert_eq!(config.segment.media_hosts, vec!["a.test/img/", "b.test/v/"]);
        assert!(!config.segment.enabled);
    }

    #[test]
    fn invalid_json_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_with(Some(&path), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"colour": "red"}"#).unwrap();
        assert!(matches!(
            load_with(Some(&path), no_env).unwrap_err(),
            ConfigError::Json(_)
        ));
    }

    #[test]
    fn validation_errors() {
        let width = load_with(None, |k| (k == "CHAT_SEGMENTS_WIDTH").then(|| "0".to_string()));
        assert!(matches!(width.unwrap_err(), ConfigError::Validation(_)));

        let bad = load_with(None, |k| (k == "CHAT_SEGMENTS_WIDTH").then(|| "wide".to_string()));
        assert!(bad.unwrap_err().to_string().contains("CHAT_SEGMENTS_WIDTH"));

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"media_hosts": ["has space/"]}"#).unwrap();
        assert!(matches!(
            load_with(Some(&path), no_env).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }
}
