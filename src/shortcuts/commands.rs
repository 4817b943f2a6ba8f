//! Named entry points: global shortcuts, in-page chords, context-menu items.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{KeyChord, Modifiers, ShortcutParseError};
use crate::state::Flag;

/// Browser-level shortcuts, routed through the coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortcutCommand {
    ToggleExtension,
    ToggleHabitMode,
    /// Sent to the focused page, which flips the flag itself
    ToggleAdvancedMode,
    /// Sent to the focused page only
    OpenAdvancedOverlay,
}

impl ShortcutCommand {
    pub const ALL: [ShortcutCommand; 4] = [
        ShortcutCommand::ToggleExtension,
        ShortcutCommand::ToggleHabitMode,
        ShortcutCommand::ToggleAdvancedMode,
        ShortcutCommand::OpenAdvancedOverlay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShortcutCommand::ToggleExtension => "toggle-extension",
            ShortcutCommand::ToggleHabitMode => "toggle-habit-mode",
            ShortcutCommand::ToggleAdvancedMode => "toggle-advanced-mode",
            ShortcutCommand::OpenAdvancedOverlay => "open-advanced-overlay",
        }
    }
}

impl fmt::Display for ShortcutCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShortcutCommand {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ShortcutCommand::ALL
            .into_iter()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| ShortcutParseError::UnknownCommand(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextMenuAction {
    Debug,
    TestOverlay,
}

impl FromStr for ContextMenuAction {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "debug" => Ok(ContextMenuAction::Debug),
            "test-overlay" => Ok(ContextMenuAction::TestOverlay),
            other => Err(ShortcutParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// Ctrl+Shift chords a page listens for, each flipping one flag
const PAGE_CHORDS: [(&str, Flag); 3] = [
    ("e", Flag::Extension),
    ("h", Flag::HabitMode),
    ("a", Flag::AdvancedMode),
];

/// Flag toggled by an in-page chord, if any
pub fn page_chord_flag(chord: &KeyChord) -> Option<Flag> {
    if chord.modifiers != Modifiers::ctrl_shift() {
        return None;
    }
    PAGE_CHORDS
        .iter()
        .find(|(key, _)| chord.key == *key)
        .map(|(_, flag)| *flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcut_names_round_trip() {
        for cmd in ShortcutCommand::ALL {
            assert_eq!(cmd.name().parse::<ShortcutCommand>().unwrap(), cmd);
        }
        assert!("toggle-dark-mode".parse::<ShortcutCommand>().is_err());
    }

    #[test]
    fn context_menu_actions_parse() {
        assert_eq!("debug".parse::<ContextMenuAction>(), Ok(ContextMenuAction::Debug));
        assert_eq!(
            "test-overlay".parse::<ContextMenuAction>(),
            Ok(ContextMenuAction::TestOverlay)
        );
    }

    #[test]
    fn page_chords_need_exactly_ctrl_shift() {
        let chord = |s: &str| KeyChord::parse(s).unwrap();
        assert_eq!(page_chord_flag(&chord("ctrl+shift+e")), Some(Flag::Extension));
        assert_eq!(page_chord_flag(&chord("Ctrl+Shift+H")), Some(Flag::HabitMode));
        assert_eq!(page_chord_flag(&chord("ctrl+shift+a")), Some(Flag::AdvancedMode));
        assert_eq!(page_chord_flag(&chord("ctrl+e")), None);
        assert_eq!(page_chord_flag(&chord("ctrl+shift+alt+e")), None);
        assert_eq!(page_chord_flag(&chord("ctrl+shift+x")), None);
    }
}
