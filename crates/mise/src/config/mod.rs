mod assistant_config;
#[allow(clippy::module_inception)]
mod config;
mod generation_config;
mod narration_config;
mod voice_config;
mod whisper_config;

pub(crate) use {
    assistant_config::AssistantConfig,
    config::Config,
    generation_config::GenerationConfig,
    narration_config::NarrationConfig,
    voice_config::{CaptureBackend, VoiceConfig},
    whisper_config::WhisperConfig,
};

pub(crate) const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub(crate) const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub(crate) const DEFAULT_RECIPE_COUNT: usize = 3;
pub(crate) const DEFAULT_SPEED: f32 = 1.0;
pub(crate) const DEFAULT_VOICE_CATALOG_WAIT_MS: u64 = 2000;
pub(crate) const DEFAULT_NO_SPEECH_TIMEOUT_SECS: u64 = 8;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_speed() -> f32 {
    DEFAULT_SPEED
}
