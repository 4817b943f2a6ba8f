//! One assistant request at a time per page.
//!
//! The request runs on a worker thread; the outcome comes back over a
//! bounded channel and is picked up by `poll` (or `wait`) on the page's
//! own event loop.

use std::sync::Arc;
use std::thread;

use async_channel::{Receiver, TryRecvError};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::prompts::{build_prompt, AssistantAction};
use super::retry::{generate_with_retry, RetryPolicy};
use super::{GenerationError, TextGenerator};

/// What the panel's output area shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AssistantOutput {
    #[default]
    Empty,
    Pending { message: String },
    Success { heading: String, body: String },
    Failure { message: String },
}

/// Result of one finished request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantOutcome {
    pub action: AssistantAction,
    pub result: Result<String, GenerationError>,
}

struct PendingRequest {
    action: AssistantAction,
    rx: Receiver<AssistantOutcome>,
}

#[derive(Default)]
pub struct AssistantSession {
    prompt: String,
    output: AssistantOutput,
    pending: Option<PendingRequest>,
}

impl AssistantSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn output(&self) -> &AssistantOutput {
        &self.output
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a request. Returns `false` when nothing was sent: blank input,
    /// a request already in flight, or no credential (rendered inline).
    pub fn start(
        &mut self,
        action: AssistantAction,
        page_text: &str,
        credential: Option<String>,
        generator: Arc<dyn TextGenerator>,
        policy: RetryPolicy,
    ) -> bool {
        if let Some(pending) = &self.pending {
            debug!(
                pending = ?pending.action,
                requested = ?action,
                "Assistant request already in flight, ignoring"
            );
            return false;
        }
        let Some(prompt) = build_prompt(action, &self.prompt, page_text) else {
            return false;
        };
        let Some(credential) = credential else {
            self.output = AssistantOutput::Failure {
                message: GenerationError::MissingCredential.user_message(),
            };
            return false;
        };

        self.output = AssistantOutput::Pending {
            message: action.pending_message().to_string(),
        };

        let (tx, rx) = async_channel::bounded(1);
        thread::spawn(move || {
            let result = generate_with_retry(generator.as_ref(), &credential, &prompt, policy);
            // Receiver gone means the page went away; nothing to report to
            let _ = tx.send_blocking(AssistantOutcome { action, result });
        });

        info!(action = ?action, "Assistant request started");
        self.pending = Some(PendingRequest { action, rx });
        true
    }

    /// Non-blocking check for a finished request
    pub fn poll(&mut self) -> Option<AssistantOutcome> {
        let pending = self.pending.as_ref()?;
        let outcome = match pending.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => AssistantOutcome {
                action: pending.action,
                result: Err(GenerationError::Transient("worker stopped".to_string())),
            },
        };
        Some(self.finish(outcome))
    }

    /// Block until the in-flight request finishes
    pub fn wait(&mut self) -> Option<AssistantOutcome> {
        let pending = self.pending.as_ref()?;
        let outcome = pending.rx.recv_blocking().unwrap_or_else(|_| AssistantOutcome {
            action: pending.action,
            result: Err(GenerationError::Transient("worker stopped".to_string())),
        });
        Some(self.finish(outcome))
    }

    fn finish(&mut self, outcome: AssistantOutcome) -> AssistantOutcome {
        self.pending = None;
        self.output = match &outcome.result {
            Ok(text) => AssistantOutput::Success {
                heading: outcome.action.success_heading().to_string(),
                body: text.clone(),
            },
            Err(e) => {
                warn!(action = ?outcome.action, error = %e, "Assistant request failed");
                AssistantOutput::Failure {
                    message: e.user_message(),
                }
            }
        };
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::testing::{transient, Scripted};
    use crate::assistant::MISSING_CREDENTIAL_MESSAGE;
    use std::time::Duration;

    const NO_DELAY: RetryPolicy = RetryPolicy {
        max_retries: 2,
        delay: Duration::ZERO,
    };

    #[test]
    fn transient_failures_then_success_render_one_result() {
        let generator = Arc::new(Scripted::new(vec![
            transient(),
            transient(),
            Ok("A short summary".into()),
        ]));
        let mut session = AssistantSession::new();

        assert!(session.start(
            AssistantAction::Summarize,
            "page text",
            Some("key".into()),
            generator.clone(),
            NO_DELAY,
        ));
        assert_eq!(
            session.output(),
            &AssistantOutput::Pending {
                message: "Generating summary...".into()
            }
        );

        let outcome = session.wait().unwrap();
        assert_eq!(outcome.result, Ok("A short summary".to_string()));
        assert_eq!(generator.calls(), 3);
        assert!(!session.is_pending());
        assert_eq!(
            session.output(),
            &AssistantOutput::Success {
                heading: "Summary generated:".into(),
                body: "A short summary".into()
            }
        );
        assert!(session.poll().is_none());
    }

    #[test]
    fn missing_credential_renders_inline_without_a_call() {
        let generator = Arc::new(Scripted::new(vec![Ok("unused".into())]));
        let mut session = AssistantSession::new();
        assert!(!session.start(
            AssistantAction::Summarize,
            "page",
            None,
            generator.clone(),
            NO_DELAY,
        ));
        assert_eq!(
            session.output(),
            &AssistantOutput::Failure {
                message: MISSING_CREDENTIAL_MESSAGE.into()
            }
        );
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn blank_prompt_for_css_does_nothing() {
        let generator = Arc::new(Scripted::new(vec![]));
        let mut session = AssistantSession::new();
        session.set_prompt("   ");
        assert!(!session.start(
            AssistantAction::ModifyCss,
            "page",
            Some("key".into()),
            generator,
            NO_DELAY,
        ));
        assert_eq!(session.output(), &AssistantOutput::Empty);
    }

    #[test]
    fn second_request_is_ignored_while_pending() {
        let generator = Arc::new(Scripted::new(vec![Ok("first".into()), Ok("second".into())]));
        let mut session = AssistantSession::new();
        assert!(session.start(
            AssistantAction::ExtractInfo,
            "page",
            Some("key".into()),
            generator.clone(),
            NO_DELAY,
        ));
        assert!(!session.start(
            AssistantAction::Summarize,
            "page",
            Some("key".into()),
            generator.clone(),
            NO_DELAY,
        ));
        let outcome = session.wait().unwrap();
        assert_eq!(outcome.action, AssistantAction::ExtractInfo);
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn auth_failure_is_rendered() {
        let generator = Arc::new(Scripted::new(vec![Err(GenerationError::Auth(401))]));
        let mut session = AssistantSession::new();
        session.set_prompt("make it dark");
        session.start(
            AssistantAction::ModifyCss,
            "page",
            Some("key".into()),
            generator,
            NO_DELAY,
        );
        session.wait();
        assert!(matches!(session.output(), AssistantOutput::Failure { .. }));
    }
}
