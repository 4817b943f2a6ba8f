//! Bounded retry with a fixed delay.

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::{GenerationError, TextGenerator};
use crate::config::AssistantConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub delay: Duration,
}

impl From<&AssistantConfig> for RetryPolicy {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: config.retry_delay(),
        }
    }
}

/// Call the generator, retrying transient failures only.
///
/// There is no cancellation: once started, this runs until it succeeds or
/// runs out of attempts.
pub fn generate_with_retry(
    generator: &dyn TextGenerator,
    credential: &str,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String, GenerationError> {
    let mut retries = 0;
    loop {
        match generator.generate(credential, prompt) {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                warn!(
                    error = %e,
                    retry = retries,
                    max_retries = policy.max_retries,
                    "Text generation failed, retrying"
                );
                thread::sleep(policy.delay);
            }
            Err(e) => return Err(e),
        }
    }
}
