use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors raised by the cooking assistant core, with source location tracking.
#[derive(Error, Debug)]
pub enum MiseError {
    /// A capture or speech primitive is not available in this environment.
    #[error("Capability missing: {capability} {location}")]
    CapabilityMissing {
        /// Name of the missing capability.
        capability: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The generation model call failed or returned nothing usable.
    #[error("Generation failed: {reason} {location}")]
    GenerationFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The remote speech synthesis call failed.
    #[error("Speech synthesis failed: {reason} {location}")]
    SynthesisFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio playback failed after synthesis succeeded.
    #[error("Playback failed: {reason} {location}")]
    PlaybackFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// HTTP transport error talking to a hosted model.
    #[error("HTTP error: {source} {location}")]
    Http {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio output device found.
    #[error("No speaker found {location}")]
    NoSpeakerFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from whisper-rs.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio data captured or provided.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A configured wake phrase pattern is not a valid regex.
    #[error("Invalid wake phrase pattern {pattern:?}: {source} {location}")]
    InvalidWakePattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Image bytes are not a recognised picture format.
    #[error("Invalid image: {reason} {location}")]
    InvalidImage {
        /// Description of the problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Neither ingredient text nor an ingredient photo was supplied.
    #[error("Enter ingredients or add a photo before generating {location}")]
    MissingIngredients {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recipe index outside the generated list.
    #[error("Recipe {index} does not exist ({len} available) {location}")]
    RecipeOutOfRange {
        /// Requested zero-based index.
        index: usize,
        /// Number of recipes available.
        len: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No recipe has been selected yet.
    #[error("No recipe selected {location}")]
    NoRecipeSelected {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recipe without instructions cannot be cooked step by step.
    #[error("Recipe {name:?} has no instructions {location}")]
    EmptyRecipe {
        /// Recipe name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A step index outside the recipe's instructions.
    #[error("Step {index} does not exist ({len} steps) {location}")]
    StepOutOfRange {
        /// Requested zero-based index.
        index: usize,
        /// Number of steps in the recipe.
        len: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An operation that needs a cooking session ran without one.
    #[error("No active cooking session {location}")]
    NoActiveSession {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl MiseError {
    /// Build a [`MiseError::GenerationFailed`] at the caller's location.
    #[track_caller]
    pub fn generation(reason: impl Into<String>) -> Self {
        MiseError::GenerationFailed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`MiseError::SynthesisFailed`] at the caller's location.
    #[track_caller]
    pub fn synthesis(reason: impl Into<String>) -> Self {
        MiseError::SynthesisFailed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`MiseError::PlaybackFailed`] at the caller's location.
    #[track_caller]
    pub fn playback(reason: impl Into<String>) -> Self {
        MiseError::PlaybackFailed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`MiseError::DeviceError`] at the caller's location.
    #[track_caller]
    pub fn device(reason: impl Into<String>) -> Self {
        MiseError::DeviceError {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

// Manual From<reqwest::Error> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<reqwest::Error> for MiseError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        MiseError::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`MiseError`].
pub type Result<T> = std::result::Result<T, MiseError>;
