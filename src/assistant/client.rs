//! Text-generation client.
//!
//! `TextGenerator` is the seam the agent and the control panel talk to;
//! `MistralClient` is the HTTP implementation (chat-completions shape,
//! bearer auth).

use serde_json::{json, Value};

use super::GenerationError;
use crate::config::AssistantConfig;

/// A single request/response text-generation call.
pub trait TextGenerator: Send + Sync {
    /// Generate text for one prompt
    fn generate(&self, credential: &str, prompt: &str) -> Result<String, GenerationError>;

    /// Cheap authenticated call to check a credential
    fn validate_credential(&self, credential: &str) -> Result<(), GenerationError>;
}

/// Chat-completions client for the configured endpoint
pub struct MistralClient {
    config: AssistantConfig,
}

impl MistralClient {
    pub fn new(config: AssistantConfig) -> Self {
        Self { config }
    }

    fn build_request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }

    /// Pull `choices[0].message.content` out of a response, trimmed
    fn extract_content(response: &Value) -> Option<String> {
        response
            .get("choices")?
            .as_array()?
            .first()?
            .get("message")?
            .get("content")?
            .as_str()
            .map(|s| s.trim().to_string())
    }
}

fn classify(err: ureq::Error) -> GenerationError {
    match err {
        ureq::Error::StatusCode(code) => GenerationError::from_status(code),
        other => GenerationError::Transient(other.to_string()),
    }
}

impl TextGenerator for MistralClient {
    fn generate(&self, credential: &str, prompt: &str) -> Result<String, GenerationError> {
        if credential.is_empty() {
            return Err(GenerationError::MissingCredential);
        }
        let body = self.build_request_body(prompt);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending text-generation request"
        );

        let response = ureq::post(self.config.endpoint.as_str())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("Authorization", &format!("Bearer {}", credential))
            .send_json(&body)
            .map_err(classify)?;

        let response_json: Value = response
            .into_body()
            .read_json()
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let content = Self::extract_content(&response_json)
            .ok_or_else(|| GenerationError::Malformed("missing completion content".to_string()))?;
        if content.is_empty() {
            return Err(GenerationError::Malformed("empty completion".to_string()));
        }

        tracing::debug!(content_len = content.len(), "Received text-generation response");
        Ok(content)
    }

    fn validate_credential(&self, credential: &str) -> Result<(), GenerationError> {
        if credential.is_empty() {
            return Err(GenerationError::MissingCredential);
        }
        ureq::get(self.config.models_endpoint.as_str())
            .header("Accept", "application/json")
            .header("Authorization", &format!("Bearer {}", credential))
            .call()
            .map_err(classify)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_construction() {
        let client = MistralClient::new(AssistantConfig::default());
        let body = client.build_request_body("Summarize this");
        assert_eq!(body["model"], "mistral-large-latest");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Summarize this");
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_extract_content() {
        let response = json!({"choices": [{"message": {"content": "  body { color: red; }\n"}}]});
        assert_eq!(
            MistralClient::extract_content(&response).as_deref(),
            Some("body { color: red; }")
        );
        assert_eq!(MistralClient::extract_content(&json!({"choices": []})), None);
    }

    #[test]
    fn test_empty_credential_fails_without_network() {
        let client = MistralClient::new(AssistantConfig::default());
        assert_eq!(
            client.generate("", "hi"),
            Err(GenerationError::MissingCredential)
        );
        assert_eq!(
            client.validate_credential(""),
            Err(GenerationError::MissingCredential)
        );
    }
}
