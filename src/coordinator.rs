//! The privileged coordinator: single owner of `SharedState`.
//!
//! Every flag change funnels through `Coordinator::apply_command`, which
//! mutates, persists, then broadcasts to every attached page. Delivery is
//! at-most-once and best effort: a page whose inbox is gone is pruned and
//! the miss is only logged at debug level.
//!
//! The coordinator lives inside a `CoordinatorProcess`. Other contexts hold a
//! `CoordinatorHandle`, a weak reference; once the process is gone every
//! request through a handle yields `None`, the same as an unanswered message.

use std::sync::{Arc, Weak};

use async_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::error::{Result, ResultExt};
use crate::logging;
use crate::protocol::{parse_command, Command, Notification};
use crate::shortcuts::{ContextMenuAction, ShortcutCommand};
use crate::state::{Flag, SharedState, StoredFlags};
use crate::storage::StateStore;

pub type PageId = u64;

struct PageLink {
    id: PageId,
    hostname: String,
    tx: Sender<Notification>,
}

pub struct Coordinator {
    state: SharedState,
    store: Arc<dyn StateStore>,
    pages: Vec<PageLink>,
    next_page_id: PageId,
    focused: Option<PageId>,
}

impl Coordinator {
    /// Rehydrate from storage. Missing keys are defaulted and the full
    /// record is written back.
    #[instrument(skip_all)]
    pub fn start(store: Arc<dyn StateStore>) -> Self {
        let stored = StoredFlags::read(store.as_ref());
        let state = stored.resolve();
        if !stored.is_complete() {
            info!(?state, "Seeding default flags");
            state.persist(store.as_ref()).warn_on_err();
        }
        Self {
            state,
            store,
            pages: Vec::new(),
            next_page_id: 1,
            focused: None,
        }
    }

    pub fn state(&self) -> SharedState {
        self.state
    }

    /// Set one flag, persist, broadcast. Broadcasts even when the value is
    /// unchanged.
    pub fn apply_command(&mut self, field: Flag, value: bool) -> SharedState {
        self.state.set(field, value);
        // In-memory state stays authoritative if the write fails
        self.state.persist(self.store.as_ref()).warn_on_err();
        logging::log_flag_change(field, value, "coordinator");
        self.broadcast(Notification::FlagChanged { field, value });
        self.state
    }

    /// Same as `apply_command` with the flag given by its wire name
    pub fn apply_raw(&mut self, field: &str, value: bool) -> Result<SharedState> {
        let flag = field.parse::<Flag>()?;
        Ok(self.apply_command(flag, value))
    }

    pub fn handle(&mut self, command: Command) -> SharedState {
        match command {
            Command::GetState => self.state,
            Command::SetFlag { field, value } => self.apply_command(field, value),
        }
    }

    /// Register a page's inbox. The newest page becomes the focused one.
    pub fn attach_page(&mut self, hostname: &str) -> (PageId, Receiver<Notification>) {
        let (tx, rx) = async_channel::unbounded();
        let id = self.next_page_id;
        self.next_page_id += 1;
        self.pages.push(PageLink {
            id,
            hostname: hostname.to_string(),
            tx,
        });
        self.focused = Some(id);
        debug!(page_id = id, hostname, "Page attached");
        (id, rx)
    }

    pub fn detach_page(&mut self, id: PageId) {
        self.pages.retain(|p| p.id != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        debug!(page_id = id, "Page detached");
    }

    /// Returns false for an unknown page
    pub fn focus_page(&mut self, id: PageId) -> bool {
        if self.pages.iter().any(|p| p.id == id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    pub fn focused_page(&self) -> Option<PageId> {
        self.focused
    }

    pub fn page_ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|p| p.id).collect()
    }

    fn broadcast(&mut self, message: Notification) {
        self.pages.retain(|page| deliver(page, message));
    }

    /// Deliver to one page. False when the page is unknown or gone.
    pub fn send_to_page(&mut self, id: PageId, message: Notification) -> bool {
        let Some(index) = self.pages.iter().position(|p| p.id == id) else {
            logging::log_delivery_miss(id, message.action_name());
            return false;
        };
        if deliver(&self.pages[index], message) {
            true
        } else {
            self.pages.remove(index);
            if self.focused == Some(id) {
                self.focused = None;
            }
            false
        }
    }

    /// Deliver to the focused page only
    pub fn send_to_focused(&mut self, message: Notification) -> bool {
        match self.focused {
            Some(id) => self.send_to_page(id, message),
            None => {
                debug!(message = message.action_name(), "No focused page");
                false
            }
        }
    }

    pub fn handle_shortcut(&mut self, shortcut: ShortcutCommand) {
        info!(shortcut = shortcut.name(), "Shortcut received");
        match shortcut {
            ShortcutCommand::ToggleExtension => {
                let value = !self.state.extension_enabled;
                self.apply_command(Flag::Extension, value);
            }
            ShortcutCommand::ToggleHabitMode => {
                let value = !self.state.habit_mode_enabled;
                self.apply_command(Flag::HabitMode, value);
            }
            ShortcutCommand::ToggleAdvancedMode => {
                self.send_to_focused(Notification::ToggleAdvancedModeOnFocusedPage);
            }
            ShortcutCommand::OpenAdvancedOverlay => {
                self.send_to_focused(Notification::OpenAssistantOnFocusedPage);
            }
        }
    }

    /// Context-menu items act on the page they were invoked on
    pub fn handle_context_menu(&mut self, page: PageId, action: ContextMenuAction) -> bool {
        let message = match action {
            ContextMenuAction::Debug => Notification::RunDebug,
            ContextMenuAction::TestOverlay => Notification::TestOverlay,
        };
        self.send_to_page(page, message)
    }
}

fn deliver(page: &PageLink, message: Notification) -> bool {
    match page.tx.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Closed(_)) => {
            logging::log_delivery_miss(page.id, message.action_name());
            debug!(page_id = page.id, hostname = %page.hostname, "Pruning closed page");
            false
        }
        // Unbounded inboxes are never full
        Err(TrySendError::Full(_)) => true,
    }
}

/// Owns the coordinator for as long as the privileged context runs
#[derive(Clone)]
pub struct CoordinatorProcess {
    inner: Arc<Mutex<Coordinator>>,
}

impl CoordinatorProcess {
    pub fn start(store: Arc<dyn StateStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Coordinator::start(store))),
        }
    }

    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Run `f` with exclusive access to the coordinator
    pub fn with<R>(&self, f: impl FnOnce(&mut Coordinator) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

/// What other contexts hold. Never keeps the coordinator alive.
#[derive(Clone)]
pub struct CoordinatorHandle {
    inner: Weak<Mutex<Coordinator>>,
}

impl CoordinatorHandle {
    /// A handle to nothing, for contexts started without a coordinator
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn with<R>(&self, f: impl FnOnce(&mut Coordinator) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let mut coordinator = inner.lock();
        Some(f(&mut coordinator))
    }

    pub fn get_state(&self) -> Option<SharedState> {
        self.with(|c| c.state())
    }

    pub fn send(&self, command: Command) -> Option<SharedState> {
        self.with(|c| c.handle(command))
    }

    pub fn set_flag(&self, field: Flag, value: bool) -> Option<SharedState> {
        self.send(Command::set_flag(field, value))
    }

    pub fn attach_page(&self, hostname: &str) -> Option<(PageId, Receiver<Notification>)> {
        self.with(|c| c.attach_page(hostname))
    }

    pub fn detach_page(&self, id: PageId) {
        self.with(|c| c.detach_page(id));
    }

    /// Wire entry point: one JSON command in, the serialized state out for
    /// `getState`. `setFlag` is fire-and-forget and answers nothing.
    pub fn handle_json(&self, line: &str) -> Option<String> {
        let command = parse_command(line)?;
        let state = self.send(command)?;
        match command {
            Command::GetState => serde_json::to_string(&state).log_err(),
            Command::SetFlag { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
