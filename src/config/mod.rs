//! Configuration module - endpoint, retry policy and overlay settings
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, AssistantConfig, OverlayConfig)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_CHAT_HOSTS, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_MIN_OVERLAY_HEIGHT,
    DEFAULT_MIN_OVERLAY_WIDTH, DEFAULT_OVERLAY_WIDTH, DEFAULT_RETRY_DELAY_MS,
};
pub use loader::{default_config_path, load_config};
pub use types::{AssistantConfig, Config, OverlayConfig};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
