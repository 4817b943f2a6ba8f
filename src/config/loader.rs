//! Configuration loading from file system

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::types::Config;

/// Default config location (~/.input-everywhere/config.json)
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.input-everywhere/config.json").as_ref())
}

/// Load configuration from a JSON file.
///
/// Returns `Config::default()` if the file is missing or cannot be parsed.
#[instrument(name = "load_config", skip_all, fields(path = %config_path.display()))]
pub fn load_config(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "Failed to read config, using defaults");
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!("Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse config JSON, using defaults");
            Config::default()
        }
    }
}
