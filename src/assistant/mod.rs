//! Assistant overlay backend: prompt templates, the text-generation
//! client, bounded retry and the per-page request session.
//!
//! ```text
//! src/assistant/
//! ├── mod.rs      - GenerationError and exports
//! ├── prompts.rs  - AssistantAction and prompt templates
//! ├── client.rs   - TextGenerator trait and the HTTP client
//! ├── retry.rs    - RetryPolicy and generate_with_retry
//! └── session.rs  - one in-flight request per page, rendered output
//! ```
//!
//! Every failure ends up as an `AssistantOutput::Failure` in the panel.
//! Nothing here can take down focus capture on the page.

mod client;
mod prompts;
mod retry;
mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{MistralClient, TextGenerator};
pub use prompts::{build_prompt, AssistantAction, MISSING_CREDENTIAL_MESSAGE};
pub use retry::{generate_with_retry, RetryPolicy};
pub use session::{AssistantOutcome, AssistantOutput, AssistantSession};

use thiserror::Error;

/// Why a text-generation call produced no text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no API key configured")]
    MissingCredential,

    /// Network failure, timeout, rate limit or server error
    #[error("transient failure: {0}")]
    Transient(String),

    /// Expired or invalid credential
    #[error("credential rejected (HTTP {0})")]
    Auth(u16),

    #[error("request rejected (HTTP {0})")]
    Rejected(u16),

    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// Only transient failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Map an HTTP status to the error taxonomy
    pub fn from_status(code: u16) -> Self {
        match code {
            401 | 403 => Self::Auth(code),
            408 | 429 | 500..=599 => Self::Transient(format!("HTTP {}", code)),
            _ => Self::Rejected(code),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
            Self::Transient(detail) => {
                format!("The assistant service is unreachable ({})", detail)
            }
            Self::Auth(_) => "Your API key was rejected. Check it in the extension settings".to_string(),
            Self::Rejected(code) => format!("The assistant service refused the request (HTTP {})", code),
            Self::Malformed(detail) => format!("The assistant returned no usable text ({})", detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_taxonomy() {
        assert_eq!(GenerationError::from_status(401), GenerationError::Auth(401));
        assert_eq!(GenerationError::from_status(403), GenerationError::Auth(403));
        assert!(GenerationError::from_status(503).is_retryable());
        assert!(GenerationError::from_status(429).is_retryable());
        assert_eq!(GenerationError::from_status(400), GenerationError::Rejected(400));
        assert!(!GenerationError::from_status(404).is_retryable());
    }

    #[test]
    fn missing_credential_message_points_to_settings() {
        assert!(GenerationError::MissingCredential
            .user_message()
            .contains("API key"));
    }
}
