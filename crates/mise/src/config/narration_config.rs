use crate::config::{DEFAULT_VOICE_CATALOG_WAIT_MS, default_speed, default_true};

use std::time::Duration;

use mise_core::{
    NarrationSettings,
    ports::SpeechOptions,
    providers::{
        DEFAULT_MAX_INPUT_CHARS, DEFAULT_OPENAI_BASE_URL, DEFAULT_SPEECH_MODEL,
        DEFAULT_SPEECH_VOICE,
    },
};
use serde::{Deserialize, Serialize};

/// Spoken reply settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Use OpenAI speech synthesis when a key is available.
    #[serde(default = "default_true")]
    pub remote_enabled: bool,

    /// OpenAI API key. `OPENAI_API_KEY` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Speech model.
    #[serde(default = "default_model")]
    pub model: String,

    /// Remote voice name.
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Remote speaking speed.
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// API host.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Longest text sent for synthesis, in characters.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Fall back to the system synthesizer.
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// System voice; unset picks one automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_voice: Option<String>,

    /// System speaking rate multiplier.
    #[serde(default = "default_speed")]
    pub rate: f32,

    /// System pitch multiplier.
    #[serde(default = "default_speed")]
    pub pitch: f32,

    /// System volume multiplier.
    #[serde(default = "default_speed")]
    pub volume: f32,

    /// How long to wait for the system voice list.
    #[serde(default = "default_voice_catalog_wait_ms")]
    pub voice_catalog_wait_ms: u64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            remote_enabled: true,
            api_key: None,
            model: default_model(),
            voice: default_voice(),
            speed: default_speed(),
            base_url: default_base_url(),
            max_input_chars: default_max_input_chars(),
            local_enabled: true,
            local_voice: None,
            rate: default_speed(),
            pitch: default_speed(),
            volume: default_speed(),
            voice_catalog_wait_ms: default_voice_catalog_wait_ms(),
        }
    }
}

impl NarrationConfig {
    /// On-device delivery settings.
    pub fn settings(&self) -> NarrationSettings {
        NarrationSettings {
            speech: SpeechOptions {
                voice: self.local_voice.clone(),
                rate: self.rate,
                pitch: self.pitch,
                volume: self.volume,
            },
            voice_catalog_wait: Duration::from_millis(self.voice_catalog_wait_ms),
        }
    }
}

fn default_model() -> String {
    DEFAULT_SPEECH_MODEL.to_string()
}

fn default_voice() -> String {
    DEFAULT_SPEECH_VOICE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

fn default_voice_catalog_wait_ms() -> u64 {
    DEFAULT_VOICE_CATALOG_WAIT_MS
}
