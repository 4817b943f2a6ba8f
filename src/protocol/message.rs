//! Protocol message enums

use serde::{Deserialize, Serialize};

use crate::state::Flag;

/// Requests sent to the coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Ask for the current in-memory state
    ///
    /// ```json
    /// {"action":"getState"}
    /// ```
    GetState,

    /// Set one flag; persisted and broadcast by the coordinator
    ///
    /// ```json
    /// {"action":"setFlag","field":"habitModeEnabled","value":false}
    /// ```
    SetFlag { field: Flag, value: bool },
}

impl Command {
    pub fn set_flag(field: Flag, value: bool) -> Self {
        Command::SetFlag { field, value }
    }

    pub fn action_name(&self) -> &'static str {
        match self {
            Command::GetState => "getState",
            Command::SetFlag { .. } => "setFlag",
        }
    }
}

/// Messages delivered into a page agent's inbox
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    /// A flag changed in the coordinator's state
    FlagChanged { field: Flag, value: bool },
    /// Flip advanced mode on this page (focused page only)
    ToggleAdvancedModeOnFocusedPage,
    /// Show the assistant overlay on this page (focused page only)
    OpenAssistantOnFocusedPage,
    /// Log a diagnostic snapshot of the page agent
    RunDebug,
    /// Force a search box scan and open the surrogate overlay
    TestOverlay,
}

impl Notification {
    pub fn action_name(&self) -> &'static str {
        match self {
            Notification::FlagChanged { .. } => "flagChanged",
            Notification::ToggleAdvancedModeOnFocusedPage => "toggleAdvancedModeOnFocusedPage",
            Notification::OpenAssistantOnFocusedPage => "openAssistantOnFocusedPage",
            Notification::RunDebug => "runDebug",
            Notification::TestOverlay => "testOverlay",
        }
    }
}
