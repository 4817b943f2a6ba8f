//! Scripted `TextGenerator` for tests. Never touches the network.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::{GenerationError, TextGenerator};

/// Plays back scripted results and records every prompt it was given
pub(crate) struct Scripted {
    results: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    pub(crate) fn new(results: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.prompts.lock().len() as u32
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl TextGenerator for Scripted {
    fn generate(&self, _credential: &str, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().push(prompt.to_string());
        self.results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Malformed("script exhausted".into())))
    }

    fn validate_credential(&self, credential: &str) -> Result<(), GenerationError> {
        if credential == "bad-key" {
            Err(GenerationError::Auth(401))
        } else {
            Ok(())
        }
    }
}

pub(crate) fn transient() -> Result<String, GenerationError> {
    Err(GenerationError::Transient("connection reset".into()))
}
