use crate::config::DEFAULT_NO_SPEECH_TIMEOUT_SECS;

use std::time::Duration;

use mise_core::{VoiceSettings, voice::DEFAULT_WAKE_PATTERNS};
use serde::{Deserialize, Serialize};

/// Where spoken commands come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureBackend {
    /// Microphone with local Whisper transcription.
    #[default]
    Microphone,
    /// Utterances typed as `> text`.
    Keyboard,
}

/// Voice input settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Capture backend.
    #[serde(default)]
    pub capture: CaptureBackend,

    /// Case-insensitive wake phrase regexes for hands-free mode.
    #[serde(default = "default_wake_phrases")]
    pub wake_phrases: Vec<String>,

    /// Pause after a reply before listening again.
    #[serde(default = "default_post_speech_delay_ms")]
    pub post_speech_delay_ms: u64,

    /// Resubscribe delay after nothing was heard.
    #[serde(default = "default_restart_ms")]
    pub no_speech_retry_ms: u64,

    /// Resubscribe delay after the device ends on its own.
    #[serde(default = "default_restart_ms")]
    pub end_restart_ms: u64,

    /// First backoff after a device error.
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// Backoff ceiling.
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_max_ms: u64,

    /// Device errors tolerated in a row; unset retries forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_error_retries: Option<u32>,

    /// Microphone silence before reporting no speech.
    #[serde(default = "default_no_speech_timeout_secs")]
    pub no_speech_timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            capture: CaptureBackend::default(),
            wake_phrases: default_wake_phrases(),
            post_speech_delay_ms: default_post_speech_delay_ms(),
            no_speech_retry_ms: default_restart_ms(),
            end_restart_ms: default_restart_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            error_backoff_max_ms: default_error_backoff_ms(),
            max_error_retries: None,
            no_speech_timeout_secs: default_no_speech_timeout_secs(),
        }
    }
}

impl VoiceConfig {
    /// Controller timing and retry policy.
    pub fn settings(&self) -> VoiceSettings {
        VoiceSettings {
            post_speech_delay: Duration::from_millis(self.post_speech_delay_ms),
            no_speech_retry_delay: Duration::from_millis(self.no_speech_retry_ms),
            end_restart_delay: Duration::from_millis(self.end_restart_ms),
            error_backoff: Duration::from_millis(self.error_backoff_ms),
            error_backoff_max: Duration::from_millis(self.error_backoff_max_ms),
            max_error_retries: self.max_error_retries,
        }
    }

    /// Microphone silence timeout.
    pub fn no_speech_timeout(&self) -> Duration {
        Duration::from_secs(self.no_speech_timeout_secs)
    }
}

fn default_wake_phrases() -> Vec<String> {
    DEFAULT_WAKE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_post_speech_delay_ms() -> u64 {
    1000
}

fn default_restart_ms() -> u64 {
    300
}

fn default_error_backoff_ms() -> u64 {
    2000
}

fn default_no_speech_timeout_secs() -> u64 {
    DEFAULT_NO_SPEECH_TIMEOUT_SECS
}
