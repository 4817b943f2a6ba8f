//! Keyboard and context-menu entry points.
//!
//! Global shortcuts go to the coordinator, which either flips a flag or
//! forwards a directive to the focused page. In-page chords are matched by
//! the page agent itself.
//!
//! # Example
//!
//! ```ignore
//! use input_everywhere::shortcuts::{page_chord_flag, KeyChord, ShortcutCommand};
//!
//! let cmd: ShortcutCommand = "toggle-habit-mode".parse()?;
//! let flag = page_chord_flag(&KeyChord::parse("ctrl+shift+h")?);
//! ```

mod commands;
mod types;

pub use commands::{page_chord_flag, ContextMenuAction, ShortcutCommand};
pub use types::{KeyChord, Modifiers, ShortcutParseError};
