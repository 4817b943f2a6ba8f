//! Cross-context message protocol
//!
//! Messages are JSON objects tagged by an `action` field.
//!
//! ## Commands (panel/page → coordinator)
//! - `getState`: answered with the current `SharedState`
//! - `setFlag`: `{field, value}` for exactly one of the three flags
//!
//! ## Notifications (coordinator → page)
//! - `flagChanged`: broadcast to every attached page after a `setFlag`
//! - `toggleAdvancedModeOnFocusedPage`, `openAssistantOnFocusedPage`:
//!   sent to the focused page only, without touching global state
//! - `runDebug`, `testOverlay`: context-menu directives for one page
//!
//! Delivery is fire-and-forget. A recipient that is not listening is not
//! an error; the message is dropped.
//!
//! - `message`: the `Command` and `Notification` enums
//! - `io`: graceful parsing with classified failures, serialization

mod io;
mod message;

pub use io::*;
pub use message::*;
