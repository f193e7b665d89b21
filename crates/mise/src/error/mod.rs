use mise_core::MiseError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the mise binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from mise-core.
    #[error("{source} {location}")]
    Core {
        /// The underlying core error.
        #[source]
        source: MiseError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A typed command could not be understood.
    #[error("Invalid command: {reason} {location}")]
    InvalidCommand {
        /// What was wrong with it.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem or terminal operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// Build an [`AppError::InvalidCommand`] at the caller's location.
    #[track_caller]
    pub fn invalid_command(reason: impl Into<String>) -> Self {
        AppError::InvalidCommand {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

// Manual From<MiseError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<MiseError> for AppError {
    #[track_caller]
    fn from(source: MiseError) -> Self {
        AppError::Core {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
