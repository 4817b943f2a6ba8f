use thiserror::Error;
use tracing::{error, warn};

use crate::assistant::GenerationError;

/// Error severity for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,    // informational, nothing to do
    Warning, // recoverable, operation degraded
    Error,   // operation failed
}

/// Domain-specific errors for the input relay
#[derive(Error, Debug)]
pub enum InputEverywhereError {
    #[error("Storage access failed for '{path}': {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored data is not valid JSON: {0}")]
    StorageFormat(#[from] serde_json::Error),

    #[error("Unknown state flag '{0}'")]
    UnknownFlag(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl InputEverywhereError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Storage { .. } => ErrorSeverity::Warning,
            Self::StorageFormat(_) => ErrorSeverity::Warning,
            Self::UnknownFlag(_) => ErrorSeverity::Info,
            Self::Generation(e) if e.is_retryable() => ErrorSeverity::Warning,
            Self::Generation(_) => ErrorSeverity::Error,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Storage { path, .. } => format!("Could not access settings at {}", path),
            Self::StorageFormat(e) => format!("Settings file is corrupt: {}", e),
            Self::UnknownFlag(name) => format!("'{}' is not a setting", name),
            Self::Generation(e) => e.user_message(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InputEverywhereError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// ```ignore
/// use input_everywhere::error::ResultExt;
///
/// // Persisting is best effort once the in-memory state has changed
/// state.persist(store.as_ref()).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_flag_is_informational() {
        let err = InputEverywhereError::UnknownFlag("darkMode".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Info);
        assert!(err.user_message().contains("darkMode"));
    }

    #[test]
    fn transient_generation_error_is_only_a_warning() {
        let err: InputEverywhereError = GenerationError::Transient("timeout".to_string()).into();
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err: InputEverywhereError = GenerationError::Auth(401).into();
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn result_ext_turns_errors_into_none() {
        let failed: std::result::Result<u8, &str> = Err("boom");
        assert_eq!(failed.warn_on_err(), None);
        let ok: std::result::Result<u8, &str> = Ok(3);
        assert_eq!(ok.log_err(), Some(3));
    }
}
