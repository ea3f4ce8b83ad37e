//! Path helpers for the config directory.

use std::path::PathBuf;

use crate::core::app;

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CHAT_SEGMENTS_CONFIG";

/// Project directories from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/chat-segments/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Config file: `CHAT_SEGMENTS_CONFIG` when set, else `config.json` in the config directory.
pub fn config_file() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_PATH_ENV)
        && !p.trim().is_empty()
    {
        return Some(PathBuf::from(p));
    }
    config_dir().map(|d| d.join("config.json"))
}
