//! Configuration type definitions

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;

// ============================================
// ASSISTANT
// ============================================

/// Remote text-generation settings. The credential is not part of the
/// config file; it lives in storage under `apiKey`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_models_endpoint")]
    pub models_endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Extra attempts after a transient failure (default: 2)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds (default: 1000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_models_endpoint() -> String {
    DEFAULT_MODELS_ENDPOINT.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            endpoint: default_endpoint(),
            models_endpoint: default_models_endpoint(),
            model: default_model(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl AssistantConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

// ============================================
// OVERLAY
// ============================================

/// Initial placement and resize limits of an overlay surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    #[serde(default = "default_overlay_x")]
    pub x: f32,
    #[serde(default = "default_overlay_y")]
    pub y: f32,
    #[serde(default = "default_overlay_width")]
    pub width: f32,
    #[serde(default = "default_overlay_height")]
    pub height: f32,
    #[serde(default = "default_min_overlay_width")]
    pub min_width: f32,
    #[serde(default = "default_min_overlay_height")]
    pub min_height: f32,
}

fn default_overlay_x() -> f32 {
    DEFAULT_OVERLAY_X
}
fn default_overlay_y() -> f32 {
    DEFAULT_OVERLAY_Y
}
fn default_overlay_width() -> f32 {
    DEFAULT_OVERLAY_WIDTH
}
fn default_overlay_height() -> f32 {
    DEFAULT_OVERLAY_HEIGHT
}
fn default_min_overlay_width() -> f32 {
    DEFAULT_MIN_OVERLAY_WIDTH
}
fn default_min_overlay_height() -> f32 {
    DEFAULT_MIN_OVERLAY_HEIGHT
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            x: DEFAULT_OVERLAY_X,
            y: DEFAULT_OVERLAY_Y,
            width: DEFAULT_OVERLAY_WIDTH,
            height: DEFAULT_OVERLAY_HEIGHT,
            min_width: DEFAULT_MIN_OVERLAY_WIDTH,
            min_height: DEFAULT_MIN_OVERLAY_HEIGHT,
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Top-level configuration, read from `~/.input-everywhere/config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Storage file for flags and credential (default: ~/.input-everywhere/storage.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Hostnames treated as chat applications by the Enter-commit policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_hosts: Option<Vec<String>>,
    #[serde(default)]
    pub surrogate: OverlayConfig,
    #[serde(default = "default_assistant_panel")]
    pub assistant_panel: OverlayConfig,
}

fn default_assistant_panel() -> OverlayConfig {
    OverlayConfig {
        x: DEFAULT_ASSISTANT_PANEL_X,
        y: DEFAULT_ASSISTANT_PANEL_Y,
        width: DEFAULT_ASSISTANT_PANEL_WIDTH,
        height: DEFAULT_ASSISTANT_PANEL_HEIGHT,
        ..OverlayConfig::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: None,
            assistant: AssistantConfig::default(),
            chat_hosts: None,
            surrogate: OverlayConfig::default(),
            assistant_panel: default_assistant_panel(),
        }
    }
}

impl Config {
    /// Returns the storage path with `~` expanded, if one is configured
    pub fn get_storage_path(&self) -> Option<PathBuf> {
        self.storage_path
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }

    /// Returns the chat hosts, or the built-in list if not configured
    pub fn get_chat_hosts(&self) -> Vec<String> {
        match &self.chat_hosts {
            Some(hosts) => hosts.iter().map(|h| h.to_lowercase()).collect(),
            None => DEFAULT_CHAT_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}
