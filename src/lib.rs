//! Input Everywhere - redirect page input into a floating editor
//!
//! This library provides the three execution contexts and the state they
//! share:
//! - a coordinator that owns the three flags and fans changes out to pages
//! - a page agent per page with the focus-interception state machine and
//!   the assistant panel
//! - a transient control panel
//!
//! Pages are reached through the `dom::Document` seam.

pub mod agent;
pub mod assistant;
pub mod config;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod panel;
pub mod protocol;
pub mod resolver;
pub mod shortcuts;
pub mod state;
pub mod stdin_commands;
pub mod storage;
