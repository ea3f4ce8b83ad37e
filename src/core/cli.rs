//! CLI-only commands: config info.
//!
//! These run without reading any message and produce plain text output.

use std::env;

use crate::core::app;
use crate::core::config::{self, Config};
use crate::core::paths;

/// Run the `config` command: display the config file location and effective settings.
pub fn run_config() {
    let file = paths::config_file()
        .map(|p| {
            let state = if p.exists() { "" } else { " (not found)" };
            format!("{}{}", p.display(), state)
        })
        .unwrap_or_else(|| "-".to_string());

    let config = config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    println!("{} {}", app::NAME, app::VERSION);
    println!("Config file:  {} ({})", file, file_source());
    for line in describe(&config) {
        println!("{}", line);
    }
}

fn file_source() -> &'static str {
    if env::var(paths::CONFIG_PATH_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .is_some()
    {
        "from CHAT_SEGMENTS_CONFIG"
    } else {
        "default"
    }
}

fn describe(config: &Config) -> Vec<String> {
    let hosts = if config.segment.media_hosts.is_empty() {
        "none".to_string()
    } else {
        config.segment.media_hosts.join(", ")
    };
    vec![
        format!(
            "Splitting:    {}",
            if config.segment.enabled { "enabled" } else { "disabled" }
        ),
        format!("Media hosts:  {}", hosts),
        format!("Width:        {}", config.width),
    ]
}
