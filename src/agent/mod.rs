//! Page agent: one per page.
//!
//! Owns the two overlay surfaces and the focus-interception state machine.
//! Input arrives three ways:
//! - `handle_event` for DOM and overlay events
//! - `process_messages` for coordinator notifications (and finished
//!   assistant requests)
//! - local key chords, which flip a flag here first and then tell the
//!   coordinator
//!
//! ```text
//! src/agent/
//! ├── mod.rs              - PageAgent, events, notifications, snapshot
//! ├── capture.rs          - Idle / ManualCapture / AutoCapture transitions
//! ├── commit.rs           - Enter-commit policy
//! └── assistant_panel.rs  - assistant surface and requests
//! ```

mod assistant_panel;
mod capture;
mod commit;

pub use assistant_panel::STYLE_SHEET_ID;
pub use capture::{CaptureState, CloseReason, Dismissal};
pub use commit::{execute_commit, plan_commit, CommitAction, CommitPlan};

use std::sync::Arc;

use async_channel::{Receiver, TryRecvError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assistant::{AssistantAction, AssistantOutput, AssistantSession, TextGenerator};
use crate::config::Config;
use crate::coordinator::{CoordinatorHandle, PageId};
use crate::dom::{Document, ElementId};
use crate::overlay::{OverlaySurface, ResizeHandle, SurfaceKind};
use crate::protocol::Notification;
use crate::resolver::find_best_candidate_with_rule;
use crate::shortcuts::{page_chord_flag, KeyChord};
use crate::state::{Flag, SharedState};
use crate::storage::StateStore;

/// Where a DOM event landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum EventTarget {
    /// A page element
    Page(ElementId),
    /// Anywhere inside one of our overlay surfaces
    Overlay(SurfaceKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageEvent {
    /// Document finished loading
    Loaded,
    /// Subtree mutation observed under the body
    Mutated,
    FocusIn { target: EventTarget },
    Click { target: EventTarget },
    /// Page-level keydown
    KeyDown { chord: KeyChord },
    /// Contents of the surrogate editor changed
    SurrogateEdited { text: String },
    /// Enter pressed inside the surrogate editor
    SurrogateEnter,
    SurrogateClosed,
    AssistantClosed,
    AssistantPromptEdited { text: String },
    AssistantRequested { action: AssistantAction },
    DragSurface { surface: SurfaceKind, dx: f32, dy: f32 },
    ResizeSurface {
        surface: SurfaceKind,
        handle: ResizeHandle,
        dx: f32,
        dy: f32,
    },
}

/// Diagnostic view of one agent, returned by the debug context-menu item
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub page_id: PageId,
    pub hostname: String,
    pub flags: SharedState,
    pub capture: CaptureState,
    pub surrogate: Option<OverlaySurface>,
    pub assistant: Option<OverlaySurface>,
    pub assistant_output: AssistantOutput,
    pub assistant_pending: bool,
    /// What a scan would pick right now, and which rule picked it
    pub candidate: Option<ElementId>,
    pub candidate_rule: Option<&'static str>,
    pub dismissal: Option<Dismissal>,
}

pub struct PageAgent {
    page_id: PageId,
    hostname: String,
    coordinator: CoordinatorHandle,
    inbox: Option<Receiver<Notification>>,
    store: Arc<dyn StateStore>,
    generator: Arc<dyn TextGenerator>,
    config: Arc<Config>,
    chat_hosts: Vec<String>,
    /// Cached copy, refreshed by notifications
    state: SharedState,
    capture: CaptureState,
    /// Last hand-close, if the scan still has to respect it
    dismissal: Option<Dismissal>,
    surrogate: Option<OverlaySurface>,
    assistant: Option<OverlaySurface>,
    session: AssistantSession,
}

impl PageAgent {
    /// Attach to the coordinator and pick up the current flags. Without a
    /// live coordinator the page runs on stored flags and gets no broadcasts.
    pub fn attach(
        coordinator: CoordinatorHandle,
        store: Arc<dyn StateStore>,
        generator: Arc<dyn TextGenerator>,
        config: Arc<Config>,
        hostname: &str,
    ) -> Self {
        let (page_id, inbox) = match coordinator.attach_page(hostname) {
            Some((id, rx)) => (id, Some(rx)),
            None => {
                debug!(hostname, "Coordinator not running, page detached");
                (0, None)
            }
        };
        let state = coordinator
            .get_state()
            .unwrap_or_else(|| SharedState::load(store.as_ref()));
        let chat_hosts = config.get_chat_hosts();

        let mut agent = Self {
            page_id,
            hostname: hostname.to_string(),
            coordinator,
            inbox,
            store,
            generator,
            config,
            chat_hosts,
            state,
            capture: CaptureState::Idle,
            dismissal: None,
            surrogate: None,
            assistant: None,
            session: AssistantSession::new(),
        };
        agent.set_assistant_visible(state.advanced_mode_enabled);
        info!(page_id, hostname, ?state, "Page agent attached");
        agent
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn state(&self) -> SharedState {
        self.state
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn surrogate(&self) -> Option<&OverlaySurface> {
        self.surrogate.as_ref()
    }

    pub fn assistant(&self) -> Option<&OverlaySurface> {
        self.assistant.as_ref()
    }

    pub fn is_surrogate_visible(&self) -> bool {
        self.surrogate.as_ref().is_some_and(|s| s.is_visible())
    }

    pub fn is_assistant_visible(&self) -> bool {
        self.assistant.as_ref().is_some_and(|s| s.is_visible())
    }

    pub fn assistant_output(&self) -> &AssistantOutput {
        self.session.output()
    }

    pub fn handle_event(&mut self, doc: &mut dyn Document, event: PageEvent) {
        match event {
            PageEvent::Loaded => {
                self.dismissal = None;
                self.rescan(doc, false);
            }
            PageEvent::Mutated => {
                self.release_if_detached(doc);
                self.rescan(doc, false);
            }
            PageEvent::FocusIn { target } => self.on_focus_in(doc, target),
            PageEvent::Click { target } => self.on_click(doc, target),
            PageEvent::KeyDown { chord } => {
                if let Some(flag) = page_chord_flag(&chord) {
                    self.toggle_locally(flag);
                }
            }
            PageEvent::SurrogateEdited { text } => self.mirror(doc, text),
            PageEvent::SurrogateEnter => self.commit(doc),
            PageEvent::SurrogateClosed => self.release(CloseReason::Closed),
            PageEvent::AssistantClosed => self.set_assistant_visible(false),
            PageEvent::AssistantPromptEdited { text } => self.session.set_prompt(text),
            PageEvent::AssistantRequested { action } => self.request_assistant(doc, action),
            PageEvent::DragSurface { surface, dx, dy } => {
                if let Some(s) = self.surface_mut(surface).filter(|s| s.is_visible()) {
                    s.drag_by(dx, dy);
                }
            }
            PageEvent::ResizeSurface {
                surface,
                handle,
                dx,
                dy,
            } => {
                if let Some(s) = self.surface_mut(surface).filter(|s| s.is_visible()) {
                    s.resize_from(handle, dx, dy);
                }
            }
        }
    }

    /// Drain the inbox in send order, then pick up a finished assistant
    /// request. Returns the snapshots produced by debug requests.
    pub fn process_messages(&mut self, doc: &mut dyn Document) -> Vec<DebugSnapshot> {
        let mut snapshots = Vec::new();
        loop {
            let next = self.inbox.as_ref().map(|rx| rx.try_recv());
            let message = match next {
                Some(Ok(message)) => message,
                Some(Err(TryRecvError::Closed)) => {
                    debug!(page_id = self.page_id, "Coordinator gone, inbox closed");
                    self.inbox = None;
                    break;
                }
                Some(Err(TryRecvError::Empty)) | None => break,
            };
            if let Some(snapshot) = self.handle_notification(doc, message) {
                snapshots.push(snapshot);
            }
        }
        self.poll_assistant(doc);
        snapshots
    }

    pub fn handle_notification(
        &mut self,
        doc: &mut dyn Document,
        message: Notification,
    ) -> Option<DebugSnapshot> {
        debug!(page_id = self.page_id, action = message.action_name(), "Notification");
        match message {
            Notification::FlagChanged { field, value } => self.apply_flag(field, value),
            Notification::ToggleAdvancedModeOnFocusedPage => {
                self.toggle_locally(Flag::AdvancedMode)
            }
            Notification::OpenAssistantOnFocusedPage => self.set_assistant_visible(true),
            Notification::RunDebug => {
                let snapshot = self.debug_snapshot(doc);
                info!(
                    page_id = self.page_id,
                    snapshot = %serde_json::to_string(&snapshot).unwrap_or_default(),
                    "Debug snapshot"
                );
                return Some(snapshot);
            }
            Notification::TestOverlay => self.rescan(doc, true),
        }
        None
    }

    /// Re-read flags from the coordinator (or storage when it is gone)
    pub fn refresh_state(&mut self) {
        let state = self
            .coordinator
            .get_state()
            .unwrap_or_else(|| SharedState::load(self.store.as_ref()));
        for flag in Flag::ALL {
            if state.get(flag) != self.state.get(flag) {
                self.apply_flag(flag, state.get(flag));
            }
        }
    }

    /// Apply a flag value and its effects on this page
    fn apply_flag(&mut self, flag: Flag, value: bool) {
        self.state.set(flag, value);
        if !self.state.capture_allowed() {
            self.release(CloseReason::FlagOff);
        }
        if flag == Flag::AdvancedMode {
            self.set_assistant_visible(value);
        }
    }

    /// Flip a flag here, then forward it. The coordinator's echo is a no-op.
    fn toggle_locally(&mut self, flag: Flag) {
        let value = !self.state.get(flag);
        self.apply_flag(flag, value);
        crate::logging::log_flag_change(flag, value, "page");
        if self.coordinator.set_flag(flag, value).is_none() {
            crate::logging::log_delivery_miss(self.page_id, "setFlag");
        }
    }

    fn surface_mut(&mut self, kind: SurfaceKind) -> Option<&mut OverlaySurface> {
        match kind {
            SurfaceKind::Surrogate => self.surrogate.as_mut(),
            SurfaceKind::Assistant => self.assistant.as_mut(),
        }
    }

    pub fn debug_snapshot(&self, doc: &dyn Document) -> DebugSnapshot {
        let found = find_best_candidate_with_rule(doc);
        DebugSnapshot {
            page_id: self.page_id,
            hostname: self.hostname.clone(),
            flags: self.state,
            capture: self.capture,
            surrogate: self.surrogate.clone(),
            assistant: self.assistant.clone(),
            assistant_output: self.session.output().clone(),
            assistant_pending: self.session.is_pending(),
            candidate: found.map(|(el, _)| el),
            candidate_rule: found.map(|(_, rule)| rule),
            dismissal: self.dismissal,
        }
    }

    /// Leave the coordinator's page list
    pub fn detach(self) {
        self.coordinator.detach_page(self.page_id);
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
