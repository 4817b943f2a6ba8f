//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default text-generation endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";
/// Endpoint used to validate a credential
pub const DEFAULT_MODELS_ENDPOINT: &str = "https://api.mistral.ai/v1/models";
pub const DEFAULT_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Extra attempts after the first failed request
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Fixed delay between attempts
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Hosts whose composer has a dedicated send control
pub const DEFAULT_CHAT_HOSTS: &[&str] = &["chat.openai.com", "chatgpt.com"];

/// Surrogate overlay geometry (pixels)
pub const DEFAULT_OVERLAY_X: f32 = 24.0;
pub const DEFAULT_OVERLAY_Y: f32 = 24.0;
pub const DEFAULT_OVERLAY_WIDTH: f32 = 360.0;
pub const DEFAULT_OVERLAY_HEIGHT: f32 = 160.0;
pub const DEFAULT_MIN_OVERLAY_WIDTH: f32 = 280.0;
pub const DEFAULT_MIN_OVERLAY_HEIGHT: f32 = 120.0;

/// Assistant panel geometry (pixels)
pub const DEFAULT_ASSISTANT_PANEL_X: f32 = 420.0;
pub const DEFAULT_ASSISTANT_PANEL_Y: f32 = 24.0;
pub const DEFAULT_ASSISTANT_PANEL_WIDTH: f32 = 380.0;
pub const DEFAULT_ASSISTANT_PANEL_HEIGHT: f32 = 320.0;
