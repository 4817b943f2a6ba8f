//! Key chords with proper error handling.
//!
//! This module provides:
//! - `KeyChord` - A key plus modifiers, as delivered by a page `keydown`
//! - `Modifiers` - Modifier key flags (ctrl, alt, shift, meta)
//! - `ShortcutParseError` - Detailed parse errors for user feedback

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing a chord or shortcut name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutParseError {
    #[error("shortcut string is empty")]
    Empty,
    #[error("shortcut has no key, only modifiers")]
    MissingKey,
    #[error("unknown token '{0}' in shortcut")]
    UnknownToken(String),
    #[error("unknown shortcut '{0}'")]
    UnknownCommand(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Default::default()
        }
    }
    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.shift || self.meta
    }
}

/// A key press. `key` is stored lower-cased so `E` and `e` compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into().to_lowercase(),
            modifiers,
        }
    }

    /// Parse "ctrl+shift+e", "Ctrl Shift E", "enter"
    pub fn parse(s: &str) -> Result<Self, ShortcutParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        let normalized = s.replace('+', " ");
        let mut modifiers = Modifiers::default();
        let mut key_part: Option<&str> = None;

        for part in normalized.split_whitespace() {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" | "ctl" => modifiers.ctrl = true,
                "alt" | "opt" | "option" => modifiers.alt = true,
                "shift" | "shft" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "super" => modifiers.meta = true,
                _ => {
                    if key_part.is_some() {
                        return Err(ShortcutParseError::UnknownToken(part.to_string()));
                    }
                    key_part = Some(part);
                }
            }
        }

        let key = key_part.ok_or(ShortcutParseError::MissingKey)?;
        Ok(Self::new(key, modifiers))
    }

    pub fn is_enter(&self) -> bool {
        self.key == "enter" && !self.modifiers.any()
    }
}

impl FromStr for KeyChord {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.modifiers.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.alt {
            parts.push("Alt".to_string());
        }
        if self.modifiers.shift {
            parts.push("Shift".to_string());
        }
        if self.modifiers.meta {
            parts.push("Meta".to_string());
        }
        let key = if self.key.chars().count() == 1 {
            self.key.to_uppercase()
        } else {
            let mut chars = self.key.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        };
        parts.push(key);
        f.write_str(&parts.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_and_separator_insensitive() {
        let a = KeyChord::parse("ctrl+shift+e").unwrap();
        let b = KeyChord::parse("Ctrl Shift E").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.modifiers, Modifiers::ctrl_shift());
        assert_eq!(a.key, "e");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(KeyChord::parse("  "), Err(ShortcutParseError::Empty));
        assert_eq!(KeyChord::parse("ctrl+shift"), Err(ShortcutParseError::MissingKey));
        assert_eq!(
            KeyChord::parse("ctrl+a+b"),
            Err(ShortcutParseError::UnknownToken("b".into()))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let chord = KeyChord::parse("shift+ctrl+a").unwrap();
        assert_eq!(chord.to_string(), "Ctrl+Shift+A");
        assert_eq!(chord.to_string().parse::<KeyChord>().unwrap(), chord);
        assert_eq!(KeyChord::parse("enter").unwrap().to_string(), "Enter");
    }

    #[test]
    fn enter_requires_no_modifiers() {
        assert!(KeyChord::parse("Enter").unwrap().is_enter());
        assert!(!KeyChord::parse("shift+enter").unwrap().is_enter());
    }
}
