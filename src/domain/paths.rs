//! # Paths
//!
//! Where the bot reads its configuration and writes its session log.

pub const DATA_DIR: &str = "data";
pub const CONFIG_FILE: &str = "config.yaml";
pub const LOG_FILE: &str = "relay.log";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "RELAY_CONFIG";

/// Returns the default config path (e.g. "data/config.yaml")
pub fn default_config_path() -> String {
    format!("{}/{}", DATA_DIR, CONFIG_FILE)
}

/// Resolves the config path, preferring `RELAY_CONFIG` when set and non-empty.
pub fn config_path() -> String {
    std::env::var(CONFIG_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(default_config_path)
}
