//! Focus interception.
//!
//! At most one element is bound to the surrogate overlay. Every binding goes
//! through `bind` and every unbinding through `release`, so "surrogate
//! visible" and "a target is bound" change together.

use serde::Serialize;
use tracing::debug;

use super::{EventTarget, PageAgent};
use crate::dom::{Document, ElementId, SyntheticEvent};
use crate::logging::log_capture;
use crate::overlay::{OverlaySurface, SurfaceKind};
use crate::resolver::find_best_candidate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "target", rename_all = "camelCase")]
pub enum CaptureState {
    #[default]
    Idle,
    /// Bound by a real focus event
    ManualCapture(ElementId),
    /// Bound by search box detection
    AutoCapture(ElementId),
}

impl CaptureState {
    pub fn target(self) -> Option<ElementId> {
        match self {
            CaptureState::Idle => None,
            CaptureState::ManualCapture(el) | CaptureState::AutoCapture(el) => Some(el),
        }
    }

    fn name(self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::ManualCapture(_) => "manual",
            CaptureState::AutoCapture(_) => "auto",
        }
    }
}

/// What a hand-close keeps the mutation scan from re-opening.
///
/// Cleared on page load, on a forced scan, when the resolver settles on a
/// different element, or when the dismissed element leaves the document.
/// A scan that finds nothing at all leaves it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum Dismissal {
    /// This auto candidate stays closed
    Candidate(ElementId),
    /// A manual overlay was closed; the next candidate found is taken as
    /// dismissed
    NextCandidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    /// Close button
    Closed,
    ClickOutside,
    /// Enter inside the surrogate
    Committed,
    /// Extension or habit mode switched off
    FlagOff,
    /// Bound element left the document
    TargetDetached,
}

impl CloseReason {
    /// The user closed it, so the scan must not re-open it
    fn is_by_hand(self) -> bool {
        matches!(
            self,
            CloseReason::Closed | CloseReason::ClickOutside | CloseReason::Committed
        )
    }

    fn name(self) -> &'static str {
        match self {
            CloseReason::Closed => "closed",
            CloseReason::ClickOutside => "click_outside",
            CloseReason::Committed => "committed",
            CloseReason::FlagOff => "flag_off",
            CloseReason::TargetDetached => "target_detached",
        }
    }
}

impl PageAgent {
    fn surrogate_surface(&mut self) -> &mut OverlaySurface {
        let geometry = self.config.surrogate;
        self.surrogate
            .get_or_insert_with(|| OverlaySurface::new(SurfaceKind::Surrogate, &geometry))
    }

    /// Bind a new target. The previous binding is released first.
    fn bind(&mut self, doc: &dyn Document, next: CaptureState) {
        let Some(el) = next.target() else {
            return;
        };
        if let Some(surface) = self.surrogate.as_mut() {
            surface.hide();
        }
        let text = doc.editable_text(el);
        self.surrogate_surface().show_bound(el, text);
        self.capture = next;
        log_capture(self.page_id, next.name(), Some(el.0));
    }

    /// Close the surrogate and return to `Idle`
    pub(super) fn release(&mut self, reason: CloseReason) {
        let previous = self.capture;
        if previous == CaptureState::Idle {
            return;
        }
        if let Some(surface) = self.surrogate.as_mut() {
            surface.hide();
        }
        self.capture = CaptureState::Idle;
        if reason.is_by_hand() {
            self.dismissal = Some(match previous {
                CaptureState::AutoCapture(el) => Dismissal::Candidate(el),
                _ => Dismissal::NextCandidate,
            });
        }
        log_capture(self.page_id, reason.name(), previous.target().map(|el| el.0));
    }

    pub(super) fn on_focus_in(&mut self, doc: &dyn Document, target: EventTarget) {
        let EventTarget::Page(el) = target else {
            return;
        };
        if !self.state.capture_allowed() || !doc.is_editable(el) {
            return;
        }
        if self.capture.target() == Some(el) {
            // Already bound; refresh the editor from the field
            let text = doc.editable_text(el);
            self.surrogate_surface().set_text(text);
            return;
        }
        self.bind(doc, CaptureState::ManualCapture(el));
    }

    /// Click outside both overlays and outside the bound target closes the
    /// surrogate and dismisses the assistant panel.
    pub(super) fn on_click(&mut self, doc: &dyn Document, target: EventTarget) {
        let EventTarget::Page(el) = target else {
            return;
        };
        if let Some(bound) = self.capture.target() {
            if doc.contains(bound, el) {
                return;
            }
        }
        self.release(CloseReason::ClickOutside);
        self.set_assistant_visible(false);
    }

    /// Run the resolver and maybe enter `AutoCapture`.
    ///
    /// A normal scan never replaces an open surrogate and never re-opens
    /// after a hand-close (see `Dismissal`). A forced scan does both.
    pub(super) fn rescan(&mut self, doc: &dyn Document, forced: bool) {
        if !self.state.capture_allowed() {
            return;
        }
        if forced {
            self.dismissal = None;
        }
        let candidate = find_best_candidate(doc);
        if let Some(Dismissal::Candidate(dismissed)) = self.dismissal {
            let replaced = candidate.is_some_and(|c| c != dismissed);
            if replaced || !doc.is_attached(dismissed) {
                self.dismissal = None;
            }
        }
        let Some(candidate) = candidate else {
            return;
        };
        if !forced {
            if self.capture != CaptureState::Idle {
                return;
            }
            match self.dismissal {
                Some(Dismissal::NextCandidate) => {
                    self.dismissal = Some(Dismissal::Candidate(candidate));
                    debug!(page_id = self.page_id, target = candidate.0, "Closed by hand, candidate dismissed");
                    return;
                }
                Some(Dismissal::Candidate(dismissed)) if dismissed == candidate => {
                    debug!(page_id = self.page_id, target = candidate.0, "Candidate dismissed, skipping");
                    return;
                }
                _ => {}
            }
        }
        if self.capture == CaptureState::AutoCapture(candidate) {
            return;
        }
        self.bind(doc, CaptureState::AutoCapture(candidate));
    }

    pub(super) fn release_if_detached(&mut self, doc: &dyn Document) {
        if let Some(el) = self.capture.target() {
            if !doc.is_attached(el) {
                self.release(CloseReason::TargetDetached);
            }
        }
    }

    /// Mirror surrogate contents into the bound target and let the page's
    /// own listeners know.
    pub(super) fn mirror(&mut self, doc: &mut dyn Document, text: String) {
        let Some(el) = self.capture.target() else {
            return;
        };
        if !doc.write_editable_text(el, &text) {
            self.release(CloseReason::TargetDetached);
            return;
        }
        doc.dispatch(el, SyntheticEvent::Input);
        self.surrogate_surface().set_text(text);
    }
}
