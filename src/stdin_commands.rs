//! Replay driver: feed page events to one agent via stdin.
//!
//! A page fixture is loaded into a `MemoryDocument` and a `PageAgent` is
//! attached to it. Driver commands then arrive as JSON objects, one per line
//! (JSONL), and a snapshot is printed after each one.
//!
//! # Protocol
//!
//! Elements are addressed by their `id` attribute, by `@N` for a raw
//! element handle, or as `surrogate` / `assistant` for the overlays.
//!
//! ```json
//! {"type": "load"}
//! {"type": "focus", "target": "q"}
//! {"type": "type", "text": "rust borrow checker"}
//! {"type": "enter"}
//! {"type": "mutate", "append": [{"tag": "input", "attrs": {"type": "search", "id": "q2"}}]}
//! {"type": "mutate", "remove": ["q2"]}
//! {"type": "click", "target": "@0"}
//! {"type": "close"}
//! {"type": "key", "chord": "ctrl+shift+h"}
//! {"type": "setFlag", "field": "advancedModeEnabled", "value": true}
//! ```
//!
//! # Example Usage
//!
//! ```bash
//! echo '{"type": "load"}' | input-everywhere replay page.json
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agent::{DebugSnapshot, EventTarget, PageAgent, PageEvent};
use crate::coordinator::CoordinatorHandle;
use crate::dom::{DispatchRecord, Document, ElementId, ElementSpec, MemoryDocument};
use crate::overlay::SurfaceKind;
use crate::shortcuts::KeyChord;
use crate::state::Flag;

/// Driver commands accepted on stdin
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DriverCommand {
    /// Document finished loading
    Load,
    /// Change the page, then report a mutation
    Mutate {
        /// New elements appended under `parent` (default: body)
        #[serde(default)]
        append: Vec<ElementSpec>,
        #[serde(default)]
        parent: Option<String>,
        /// Elements to remove, by target
        #[serde(default)]
        remove: Vec<String>,
    },
    Focus { target: String },
    Click { target: String },
    /// Replace the surrogate editor contents
    Type { text: String },
    /// Enter inside the surrogate
    Enter,
    /// Close button of the surrogate
    Close,
    /// Page-level key press, e.g. "ctrl+shift+e"
    Key { chord: String },
    /// Flip a flag the way the control panel does
    SetFlag { field: Flag, value: bool },
}

impl DriverCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DriverCommand::Load => "load",
            DriverCommand::Mutate { .. } => "mutate",
            DriverCommand::Focus { .. } => "focus",
            DriverCommand::Click { .. } => "click",
            DriverCommand::Type { .. } => "type",
            DriverCommand::Enter => "enter",
            DriverCommand::Close => "close",
            DriverCommand::Key { .. } => "key",
            DriverCommand::SetFlag { .. } => "setFlag",
        }
    }
}

/// Printed after every command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub command: &'static str,
    /// False when the command could not be applied (unknown target, ...)
    pub applied: bool,
    pub agent: DebugSnapshot,
    /// Current value of the bound target, if any
    pub bound_value: Option<String>,
    /// Synthetic events, clicks and submits caused by this command
    pub dispatched: Vec<DispatchRecord>,
}

/// One page and its agent, driven by commands
pub struct ReplaySession {
    doc: MemoryDocument,
    agent: PageAgent,
    coordinator: CoordinatorHandle,
}

impl ReplaySession {
    pub fn new(doc: MemoryDocument, agent: PageAgent, coordinator: CoordinatorHandle) -> Self {
        Self {
            doc,
            agent,
            coordinator,
        }
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.doc
    }

    pub fn agent(&self) -> &PageAgent {
        &self.agent
    }

    /// Resolve a driver target string
    fn resolve(&self, target: &str) -> Option<EventTarget> {
        match target {
            "surrogate" => Some(EventTarget::Overlay(SurfaceKind::Surrogate)),
            "assistant" => Some(EventTarget::Overlay(SurfaceKind::Assistant)),
            _ => self.resolve_element(target).map(EventTarget::Page),
        }
    }

    fn resolve_element(&self, target: &str) -> Option<ElementId> {
        match target.strip_prefix('@') {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .map(ElementId)
                .filter(|&el| self.doc.is_attached(el)),
            None => self.doc.find_by_id(target),
        }
    }

    pub fn apply(&mut self, command: DriverCommand) -> ReplayReport {
        let name = command.name();
        self.doc.clear_dispatched();
        let applied = match command {
            DriverCommand::Load => self.event(PageEvent::Loaded),
            DriverCommand::Mutate {
                append,
                parent,
                remove,
            } => self.mutate(append, parent, remove),
            DriverCommand::Focus { target } => match self.resolve(&target) {
                Some(target) => self.event(PageEvent::FocusIn { target }),
                None => false,
            },
            DriverCommand::Click { target } => match self.resolve(&target) {
                Some(target) => self.event(PageEvent::Click { target }),
                None => false,
            },
            DriverCommand::Type { text } => self.event(PageEvent::SurrogateEdited { text }),
            DriverCommand::Enter => self.event(PageEvent::SurrogateEnter),
            DriverCommand::Close => self.event(PageEvent::SurrogateClosed),
            DriverCommand::Key { chord } => match KeyChord::parse(&chord) {
                Ok(chord) => self.event(PageEvent::KeyDown { chord }),
                Err(e) => {
                    warn!(error = %e, "Bad chord");
                    false
                }
            },
            DriverCommand::SetFlag { field, value } => {
                self.coordinator.set_flag(field, value).is_some()
            }
        };
        if !applied {
            debug!(command = name, "Driver command not applied");
        }
        // Deliver whatever the command caused
        self.agent.process_messages(&mut self.doc);
        self.report(name, applied)
    }

    fn event(&mut self, event: PageEvent) -> bool {
        self.agent.handle_event(&mut self.doc, event);
        true
    }

    fn mutate(&mut self, append: Vec<ElementSpec>, parent: Option<String>, remove: Vec<String>) -> bool {
        let parent = match parent {
            Some(target) => match self.resolve_element(&target) {
                Some(el) => el,
                None => return false,
            },
            None => self.doc.body(),
        };
        for spec in &append {
            self.doc.append(parent, spec);
        }
        for target in &remove {
            if let Some(el) = self.resolve_element(target) {
                self.doc.remove(el);
            }
        }
        self.event(PageEvent::Mutated)
    }

    fn report(&self, command: &'static str, applied: bool) -> ReplayReport {
        let bound_value = self
            .agent
            .capture_state()
            .target()
            .map(|el| self.doc.editable_text(el));
        ReplayReport {
            command,
            applied,
            agent: self.agent.debug_snapshot(&self.doc),
            bound_value,
            dispatched: self.doc.dispatched().to_vec(),
        }
    }

    pub fn into_parts(self) -> (MemoryDocument, PageAgent) {
        (self.doc, self.agent)
    }
}

/// Start a thread that listens on stdin for driver commands.
///
/// Uses a bounded channel (capacity 100). The thread exits when stdin ends
/// or the receiver is dropped.
pub fn start_stdin_listener() -> async_channel::Receiver<DriverCommand> {
    let (tx, rx) = async_channel::bounded(100);

    std::thread::spawn(move || {
        info!(event_type = "stdin", "Driver command listener started");
        let stdin = std::io::stdin();
        let reader = stdin.lock();

        for line in reader.lines() {
            match line {
                Ok(line) if !line.trim().is_empty() => {
                    match serde_json::from_str::<DriverCommand>(&line) {
                        Ok(cmd) => {
                            debug!(command = ?cmd, "Parsed driver command");
                            // send_blocking since this is a plain thread
                            if tx.send_blocking(cmd).is_err() {
                                debug!("Driver channel closed, exiting");
                                break;
                            }
                        }
                        Err(e) => {
                            let (preview, len) = crate::protocol::log_preview(&line);
                            warn!(error = %e, raw = preview, raw_len = len, "Failed to parse driver command");
                        }
                    }
                }
                Ok(_) => {} // Empty line, ignore
                Err(e) => {
                    warn!(error = %e, "Error reading stdin");
                    break;
                }
            }
        }
        info!(event_type = "stdin", "Driver command listener exiting");
    });

    rx
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::testing::Scripted;
    use crate::config::Config;
    use crate::coordinator::CoordinatorProcess;
    use crate::dom::{KeyPhase, PageFixture, SyntheticEvent};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn session(process: &CoordinatorProcess, fixture: &str) -> ReplaySession {
        let fixture: PageFixture = serde_json::from_str(fixture).unwrap();
        let doc = MemoryDocument::from_fixture(&fixture);
        let store = Arc::new(MemoryStore::new());
        let agent = PageAgent::attach(
            process.handle(),
            store,
            Arc::new(Scripted::new(vec![])),
            Arc::new(Config::default()),
            &fixture.hostname,
        );
        ReplaySession::new(doc, agent, process.handle())
    }

    fn command(json: &str) -> DriverCommand {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_driver_command_deserialization() {
        assert!(matches!(command(r#"{"type": "load"}"#), DriverCommand::Load));
        match command(r#"{"type": "focus", "target": "q"}"#) {
            DriverCommand::Focus { target } => assert_eq!(target, "q"),
            other => panic!("Expected Focus, got {:?}", other),
        }
        match command(r#"{"type": "setFlag", "field": "habitModeEnabled", "value": false}"#) {
            DriverCommand::SetFlag { field, value } => {
                assert_eq!(field, Flag::HabitMode);
                assert!(!value);
            }
            other => panic!("Expected SetFlag, got {:?}", other),
        }
        match command(r#"{"type": "mutate"}"#) {
            DriverCommand::Mutate {
                append,
                parent,
                remove,
            } => {
                assert!(append.is_empty() && remove.is_empty() && parent.is_none());
            }
            other => panic!("Expected Mutate, got {:?}", other),
        }
        assert!(serde_json::from_str::<DriverCommand>(r#"{"type": "explode"}"#).is_err());
    }

    #[test]
    fn test_replay_search_box_scenario() {
        let process = CoordinatorProcess::start(Arc::new(MemoryStore::new()));
        let mut replay = session(
            &process,
            r#"{"hostname":"example.com","body":[{"tag":"input","attrs":{"type":"search","id":"q"}}]}"#,
        );
        let q = replay.document().find_by_id("q").unwrap();

        let report = replay.apply(command(r#"{"type": "load"}"#));
        assert_eq!(report.agent.capture.target(), Some(q));

        let report = replay.apply(command(r#"{"type": "type", "text": "ferris"}"#));
        assert_eq!(report.bound_value.as_deref(), Some("ferris"));
        assert_eq!(
            report.dispatched,
            vec![DispatchRecord::Event {
                target: q,
                event: SyntheticEvent::Input
            }]
        );

        let report = replay.apply(command(r#"{"type": "enter"}"#));
        assert_eq!(report.agent.capture.target(), None);
        assert_eq!(
            report.dispatched,
            KeyPhase::TRIPLET
                .into_iter()
                .map(|phase| DispatchRecord::Event {
                    target: q,
                    event: SyntheticEvent::EnterKey(phase)
                })
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_replay_set_flag_reaches_agent() {
        let process = CoordinatorProcess::start(Arc::new(MemoryStore::new()));
        let mut replay = session(&process, r#"{"hostname":"example.com"}"#);
        let report = replay.apply(command(
            r#"{"type": "setFlag", "field": "advancedModeEnabled", "value": true}"#,
        ));
        assert!(report.applied);
        assert!(report.agent.flags.advanced_mode_enabled);
        assert!(report.agent.assistant.map(|s| s.is_visible()).unwrap_or(false));
    }

    #[test]
    fn test_replay_unknown_target_is_not_applied() {
        let process = CoordinatorProcess::start(Arc::new(MemoryStore::new()));
        let mut replay = session(&process, r#"{"hostname":"example.com"}"#);
        let report = replay.apply(command(r#"{"type": "focus", "target": "missing"}"#));
        assert!(!report.applied);
        let report = replay.apply(command(r#"{"type": "click", "target": "@999"}"#));
        assert!(!report.applied);
    }

    #[test]
    fn test_replay_mutate_appends_and_removes() {
        let process = CoordinatorProcess::start(Arc::new(MemoryStore::new()));
        let mut replay = session(&process, r#"{"hostname":"example.com"}"#);
        let report = replay.apply(command(
            r#"{"type": "mutate", "append": [{"tag": "input", "attrs": {"type": "search", "id": "late"}}]}"#,
        ));
        let late = replay.document().find_by_id("late");
        assert!(late.is_some());
        assert_eq!(report.agent.capture.target(), late);

        let report = replay.apply(command(r#"{"type": "mutate", "remove": ["late"]}"#));
        assert_eq!(report.agent.capture.target(), None);
        assert!(replay.document().find_by_id("late").is_none());
    }
}
