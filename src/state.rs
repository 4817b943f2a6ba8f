//! The three shared flags and their persistence contract.
//!
//! One logical `SharedState` exists per session and it is owned by the
//! coordinator. Every other context keeps a cached copy refreshed by
//! `flagChanged` notifications or an explicit `getState` request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InputEverywhereError, Result};
use crate::storage::StateStore;

/// Storage keys. Absent keys mean "use the default".
pub mod keys {
    pub const EXTENSION_ENABLED: &str = "extensionEnabled";
    pub const HABIT_MODE_ENABLED: &str = "habitModeEnabled";
    pub const ADVANCED_MODE_ENABLED: &str = "advancedModeEnabled";
    pub const API_KEY: &str = "apiKey";
}

/// One of the three shared boolean flags. Commands always target exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    #[serde(rename = "extensionEnabled")]
    Extension,
    #[serde(rename = "habitModeEnabled")]
    HabitMode,
    #[serde(rename = "advancedModeEnabled")]
    AdvancedMode,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Extension, Flag::HabitMode, Flag::AdvancedMode];

    /// Storage and wire key
    pub fn key(self) -> &'static str {
        match self {
            Flag::Extension => keys::EXTENSION_ENABLED,
            Flag::HabitMode => keys::HABIT_MODE_ENABLED,
            Flag::AdvancedMode => keys::ADVANCED_MODE_ENABLED,
        }
    }

    pub fn default_value(self) -> bool {
        match self {
            Flag::Extension => true,
            Flag::HabitMode => true,
            Flag::AdvancedMode => false,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Flag {
    type Err = InputEverywhereError;

    fn from_str(s: &str) -> Result<Self> {
        Flag::ALL
            .into_iter()
            .find(|flag| flag.key() == s)
            .ok_or_else(|| InputEverywhereError::UnknownFlag(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedState {
    pub extension_enabled: bool,
    pub habit_mode_enabled: bool,
    pub advanced_mode_enabled: bool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            extension_enabled: Flag::Extension.default_value(),
            habit_mode_enabled: Flag::HabitMode.default_value(),
            advanced_mode_enabled: Flag::AdvancedMode.default_value(),
        }
    }
}

/// Flags as they sit in storage, before defaults are filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredFlags {
    pub extension_enabled: Option<bool>,
    pub habit_mode_enabled: Option<bool>,
    pub advanced_mode_enabled: Option<bool>,
}

impl StoredFlags {
    pub fn read(store: &dyn StateStore) -> Self {
        let flag = |f: Flag| store.get(f.key()).and_then(|v| v.as_bool());
        Self {
            extension_enabled: flag(Flag::Extension),
            habit_mode_enabled: flag(Flag::HabitMode),
            advanced_mode_enabled: flag(Flag::AdvancedMode),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.extension_enabled.is_some()
            && self.habit_mode_enabled.is_some()
            && self.advanced_mode_enabled.is_some()
    }

    /// Fill missing keys with defaults
    pub fn resolve(&self) -> SharedState {
        let defaults = SharedState::default();
        SharedState {
            extension_enabled: self.extension_enabled.unwrap_or(defaults.extension_enabled),
            habit_mode_enabled: self.habit_mode_enabled.unwrap_or(defaults.habit_mode_enabled),
            advanced_mode_enabled: self
                .advanced_mode_enabled
                .unwrap_or(defaults.advanced_mode_enabled),
        }
    }
}

impl SharedState {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Extension => self.extension_enabled,
            Flag::HabitMode => self.habit_mode_enabled,
            Flag::AdvancedMode => self.advanced_mode_enabled,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Extension => self.extension_enabled = value,
            Flag::HabitMode => self.habit_mode_enabled = value,
            Flag::AdvancedMode => self.advanced_mode_enabled = value,
        }
    }

    /// Both switches that gate focus interception are on
    pub fn capture_allowed(&self) -> bool {
        self.extension_enabled && self.habit_mode_enabled
    }

    /// Read from storage, filling in defaults for absent keys.
    pub fn load(store: &dyn StateStore) -> Self {
        StoredFlags::read(store).resolve()
    }

    /// Write all three flags. Never writes a partial record.
    pub fn persist(&self, store: &dyn StateStore) -> Result<()> {
        let entries: Vec<(&str, Value)> = Flag::ALL
            .into_iter()
            .map(|flag| (flag.key(), Value::Bool(self.get(flag))))
            .collect();
        store.set_many(&entries)
    }
}
