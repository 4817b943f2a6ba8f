//! Assistant overlay: visibility and requests.

use tracing::{debug, info};

use super::PageAgent;
use crate::assistant::{AssistantAction, AssistantOutcome, RetryPolicy};
use crate::dom::Document;
use crate::overlay::{OverlaySurface, SurfaceKind};

/// Identifier of the one style sheet generated CSS is installed into
pub const STYLE_SHEET_ID: &str = "input-everywhere-style";

impl PageAgent {
    /// Show or hide the panel. Hiding never creates the surface.
    pub(super) fn set_assistant_visible(&mut self, visible: bool) {
        if visible {
            let geometry = self.config.assistant_panel;
            self.assistant
                .get_or_insert_with(|| OverlaySurface::new(SurfaceKind::Assistant, &geometry))
                .show();
        } else if let Some(surface) = self.assistant.as_mut() {
            surface.hide();
        }
    }

    pub(super) fn request_assistant(&mut self, doc: &dyn Document, action: AssistantAction) {
        if !self.is_assistant_visible() {
            debug!(page_id = self.page_id, ?action, "Assistant hidden, ignoring request");
            return;
        }
        let page_text = if action.page_text_limit().is_some() {
            doc.page_text()
        } else {
            String::new()
        };
        self.session.start(
            action,
            &page_text,
            self.store.api_key(),
            self.generator.clone(),
            RetryPolicy::from(&self.config.assistant),
        );
    }

    /// Apply a finished request, if there is one. Never blocks.
    pub fn poll_assistant(&mut self, doc: &mut dyn Document) -> Option<AssistantOutcome> {
        let outcome = self.session.poll()?;
        self.apply_outcome(doc, &outcome);
        Some(outcome)
    }

    /// Block until the in-flight request finishes and apply it
    pub fn wait_for_assistant(&mut self, doc: &mut dyn Document) -> Option<AssistantOutcome> {
        let outcome = self.session.wait()?;
        self.apply_outcome(doc, &outcome);
        Some(outcome)
    }

    fn apply_outcome(&mut self, doc: &mut dyn Document, outcome: &AssistantOutcome) {
        if let (AssistantAction::ModifyCss, Ok(css)) = (outcome.action, &outcome.result) {
            doc.install_style_sheet(STYLE_SHEET_ID, css);
            info!(page_id = self.page_id, bytes = css.len(), "Generated CSS installed");
        }
    }
}
