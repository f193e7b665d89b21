//! Mise Core Library
//!
//! Voice-guided cooking assistant: recipe generation from preferences,
//! best-effort recipe parsing, a step-by-step cooking session, and a
//! hands-free voice controller gated by a wake phrase.
//!
//! # Example
//!
//! ```no_run
//! use mise_core::{
//!     CookingAssistant, CoreResult, GeminiClient, NarrationService, NarrationSettings,
//!     Preferences, ViewController,
//! };
//!
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let gemini = Arc::new(GeminiClient::new("api-key"));
//!     let assistant = CookingAssistant::new(gemini.clone(), Default::default());
//!     let mut view = ViewController::new(gemini, assistant, 3);
//!
//!     let preferences = Preferences {
//!         ingredients: "eggs, spinach, feta".to_string(),
//!         ..Default::default()
//!     };
//!     view.generate_recipes(preferences).await?;
//!     view.select_recipe(0)?;
//!
//!     let narration = NarrationService::new(NarrationSettings::default());
//!     narration.speak(&view.start_cooking().await?).await?;
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
pub mod narration;
pub mod ports;
pub mod providers;
pub mod recipe;
pub mod session;
pub mod view;
pub mod voice;

pub use {
    audio::{MicrophoneCapture, SpeakerPlayback, SpeechRecognizer, WHISPER_SAMPLE_RATE},
    error::{MiseError, Result as CoreResult},
    narration::{NarrationService, NarrationSettings, SystemSpeech},
    providers::{GeminiClient, OpenAiSpeechClient, UnconfiguredGeneration},
    recipe::{CookingTime, Dietary, DishType, Mood, Photo, Preferences, Recipe},
    session::{CookingAssistant, CookingSession, Exchange, SessionHandle},
    view::{Screen, ViewController},
    voice::{
        VoiceHandle, VoiceMode, VoiceNotice, VoicePhase, VoiceSessionController, VoiceSettings,
        VoiceStatus, WakePhraseMatcher,
    },
};

#[cfg(test)]
mod tests;
