//! Protocol I/O: parsing with classified failures, serialization

use serde_json::Value;
use tracing::warn;

use super::message::{Command, Notification};
use crate::state::Flag;

/// Maximum length for raw JSON in logs
const MAX_RAW_LOG_PREVIEW: usize = 200;

/// Get a truncated preview of raw JSON for logging
pub fn log_preview(raw: &str) -> (&str, usize) {
    let len = raw.len();
    if len > MAX_RAW_LOG_PREVIEW {
        let mut end = MAX_RAW_LOG_PREVIEW;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        (&raw[..end], len)
    } else {
        (raw, len)
    }
}

/// Result of parsing one command from the wire
#[derive(Debug)]
pub enum ParseResult {
    Ok(Command),
    /// No "action" field
    MissingAction { raw: String },
    /// Valid JSON with an action we don't know
    UnknownAction { action: String, raw: String },
    /// `setFlag` naming something other than the three known flags
    UnknownFlag { field: String, raw: String },
    /// Known action but wrong or missing fields
    InvalidPayload {
        action: String,
        error: String,
        raw: String,
    },
    /// JSON syntax error
    ParseError(serde_json::Error),
}

/// Parse a command, classifying every failure instead of just erroring.
///
/// Parses to `serde_json::Value` once, then converts.
pub fn parse_command_graceful(line: &str) -> ParseResult {
    let (preview, _raw_len) = log_preview(line);

    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return ParseResult::ParseError(e),
    };

    let action: String = match value.get("action").and_then(|a| a.as_str()) {
        Some(a) => a.to_string(),
        None => {
            return ParseResult::MissingAction {
                raw: preview.to_string(),
            }
        }
    };

    if action == "setFlag" {
        if let Some(field) = value.get("field").and_then(|f| f.as_str()) {
            if field.parse::<Flag>().is_err() {
                return ParseResult::UnknownFlag {
                    field: field.to_string(),
                    raw: preview.to_string(),
                };
            }
        }
    }

    match serde_json::from_value::<Command>(value) {
        Ok(cmd) => ParseResult::Ok(cmd),
        Err(e) => {
            let error_str = e.to_string();
            if error_str.contains("unknown variant") {
                ParseResult::UnknownAction {
                    action,
                    raw: preview.to_string(),
                }
            } else {
                ParseResult::InvalidPayload {
                    action,
                    error: error_str,
                    raw: preview.to_string(),
                }
            }
        }
    }
}

/// Parse a command, logging and discarding anything unusable
pub fn parse_command(line: &str) -> Option<Command> {
    match parse_command_graceful(line) {
        ParseResult::Ok(cmd) => Some(cmd),
        other => {
            warn!(result = ?other, "Discarding unusable command");
            None
        }
    }
}

pub fn serialize_command(cmd: &Command) -> Result<String, serde_json::Error> {
    serde_json::to_string(cmd)
}

pub fn serialize_notification(msg: &Notification) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

pub fn parse_notification(line: &str) -> Result<Notification, serde_json::Error> {
    serde_json::from_str(line)
}
