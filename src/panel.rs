//! Control panel: the three toggles and the credential field.
//!
//! Transient. It is opened, used for one interaction or a few, and closed;
//! nothing here runs in the background. It never talks to pages directly.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::assistant::TextGenerator;
use crate::coordinator::CoordinatorHandle;
use crate::error::ResultExt;
use crate::state::{Flag, SharedState, StoredFlags};
use crate::storage::StateStore;

pub const EMPTY_CREDENTIAL_MESSAGE: &str = "Please enter an API key";
pub const CREDENTIAL_SAVED_MESSAGE: &str = "API key saved successfully!";
pub const CREDENTIAL_VALID_MESSAGE: &str = "API key is valid!";
pub const CREDENTIAL_INVALID_MESSAGE: &str = "API key validation failed. Please check your key.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum PanelStatus {
    Success(String),
    Error(String),
}

/// Where the panel's flags came from when it opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlagSource {
    Coordinator,
    Storage,
}

pub struct ControlPanel {
    coordinator: CoordinatorHandle,
    store: Arc<dyn StateStore>,
    generator: Arc<dyn TextGenerator>,
    flags: SharedState,
    source: FlagSource,
    credential: String,
    status: Option<PanelStatus>,
}

impl ControlPanel {
    /// Read the live copy and the stored copy; the live one wins.
    pub fn open(
        coordinator: CoordinatorHandle,
        store: Arc<dyn StateStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let stored = StoredFlags::read(store.as_ref()).resolve();
        let (flags, source) = match coordinator.get_state() {
            Some(live) => (live, FlagSource::Coordinator),
            None => (stored, FlagSource::Storage),
        };
        let credential = store.api_key().unwrap_or_default();
        Self {
            coordinator,
            store,
            generator,
            flags,
            source,
            credential,
            status: None,
        }
    }

    pub fn flags(&self) -> SharedState {
        self.flags
    }

    pub fn source(&self) -> FlagSource {
        self.source
    }

    /// Pre-filled from storage
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// The credential section is only shown in advanced mode
    pub fn is_credential_section_visible(&self) -> bool {
        self.flags.advanced_mode_enabled
    }

    pub fn status(&self) -> Option<&PanelStatus> {
        self.status.as_ref()
    }

    /// One toggle click: send the command and update the stored mirror
    pub fn toggle(&mut self, flag: Flag) -> bool {
        let value = !self.flags.get(flag);
        self.set(flag, value);
        value
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        self.flags.set(flag, value);
        if self.coordinator.set_flag(flag, value).is_none() {
            warn!(flag = flag.key(), "Coordinator not running, change only stored");
        }
        self.flags.persist(self.store.as_ref()).warn_on_err();
    }

    /// Save, then validate. A failed validation is reported but the
    /// credential stays saved.
    pub fn save_credential(&mut self, input: &str) -> &PanelStatus {
        let credential = input.trim();
        if credential.is_empty() {
            return self.set_status(PanelStatus::Error(EMPTY_CREDENTIAL_MESSAGE.to_string()));
        }
        if let Err(e) = self.store.set_api_key(credential) {
            warn!(error = %e, "Could not save credential");
            return self.set_status(PanelStatus::Error(e.user_message()));
        }
        self.credential = credential.to_string();
        info!("Credential saved");
        self.set_status(PanelStatus::Success(CREDENTIAL_SAVED_MESSAGE.to_string()));

        let status = match self.generator.validate_credential(credential) {
            Ok(()) => PanelStatus::Success(CREDENTIAL_VALID_MESSAGE.to_string()),
            Err(e) => {
                warn!(error = %e, "Credential validation failed");
                PanelStatus::Error(CREDENTIAL_INVALID_MESSAGE.to_string())
            }
        };
        self.set_status(status)
    }

    fn set_status(&mut self, status: PanelStatus) -> &PanelStatus {
        self.status.insert(status)
    }

    pub fn close(self) {
        info!("Control panel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::testing::Scripted;
    use crate::coordinator::CoordinatorProcess;
    use crate::state::keys;
    use crate::storage::MemoryStore;
    use serde_json::Value;

    fn generator() -> Arc<Scripted> {
        Arc::new(Scripted::new(vec![]))
    }

    #[test]
    fn live_state_wins_over_storage() {
        let store = Arc::new(MemoryStore::new());
        let process = CoordinatorProcess::start(store.clone());
        process.with(|c| c.apply_command(Flag::AdvancedMode, true));
        // Stored copy drifts behind the coordinator
        store
            .set_many(&[(keys::ADVANCED_MODE_ENABLED, Value::Bool(false))])
            .unwrap();

        let panel = ControlPanel::open(process.handle(), store, generator());
        assert_eq!(panel.source(), FlagSource::Coordinator);
        assert!(panel.flags().advanced_mode_enabled);
        assert!(panel.is_credential_section_visible());
    }

    #[test]
    fn storage_is_the_fallback() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_many(&[(keys::EXTENSION_ENABLED, Value::Bool(false))])
            .unwrap();
        store.set_api_key("stored-key").unwrap();

        let panel = ControlPanel::open(CoordinatorHandle::detached(), store, generator());
        assert_eq!(panel.source(), FlagSource::Storage);
        assert!(!panel.flags().extension_enabled);
        assert!(panel.flags().habit_mode_enabled);
        assert_eq!(panel.credential(), "stored-key");
        assert!(!panel.is_credential_section_visible());
    }

    #[test]
    fn toggle_commands_coordinator_and_mirrors_storage() {
        let store = Arc::new(MemoryStore::new());
        let process = CoordinatorProcess::start(store.clone());
        let (_, inbox) = process.with(|c| c.attach_page("example.com"));

        let mut panel = ControlPanel::open(process.handle(), store.clone(), generator());
        assert!(panel.toggle(Flag::AdvancedMode));
        assert!(panel.is_credential_section_visible());
        assert!(process.with(|c| c.state().advanced_mode_enabled));
        assert!(SharedState::load(store.as_ref()).advanced_mode_enabled);
        assert_eq!(inbox.len(), 1);
        panel.close();
    }

    #[test]
    fn empty_credential_is_rejected_without_saving() {
        let store = Arc::new(MemoryStore::new());
        let mut panel = ControlPanel::open(CoordinatorHandle::detached(), store.clone(), generator());
        assert_eq!(
            panel.save_credential("   "),
            &PanelStatus::Error(EMPTY_CREDENTIAL_MESSAGE.to_string())
        );
        assert_eq!(store.api_key(), None);
    }

    #[test]
    fn failed_validation_keeps_the_saved_credential() {
        let store = Arc::new(MemoryStore::new());
        let mut panel = ControlPanel::open(CoordinatorHandle::detached(), store.clone(), generator());
        assert_eq!(
            panel.save_credential(" bad-key "),
            &PanelStatus::Error(CREDENTIAL_INVALID_MESSAGE.to_string())
        );
        assert_eq!(store.api_key().as_deref(), Some("bad-key"));

        assert_eq!(
            panel.save_credential("good-key"),
            &PanelStatus::Success(CREDENTIAL_VALID_MESSAGE.to_string())
        );
        assert_eq!(panel.credential(), "good-key");
    }
}
