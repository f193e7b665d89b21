use crate::CoreResult;

use async_trait::async_trait;

/// A remote text-to-speech service.
#[async_trait]
pub trait RemoteSynthesisPort: Send + Sync {
    /// Synthesize text into encoded audio (MP3).
    async fn synthesize(&self, text: &str) -> CoreResult<Vec<u8>>;
}

/// Local audio output for synthesized speech.
#[async_trait]
pub trait AudioSinkPort: Send + Sync {
    /// Play encoded audio, resolving once playback has finished.
    async fn play(&self, audio: Vec<u8>) -> CoreResult<()>;
}

/// An installed voice of the on-device synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Identifier passed back to the synthesizer.
    pub name: String,
    /// Language tag such as `en-US`, when known.
    pub language: Option<String>,
}

/// Delivery settings for on-device speech. `1.0` is the engine default.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    /// Voice to use; `None` keeps the engine default.
    pub voice: Option<String>,
    /// Speaking rate multiplier.
    pub rate: f32,
    /// Pitch multiplier.
    pub pitch: f32,
    /// Volume multiplier.
    pub volume: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// The on-device speech synthesizer.
#[async_trait]
pub trait LocalSpeechPort: Send + Sync {
    /// Whether a synthesizer exists in this environment.
    fn is_available(&self) -> bool;

    /// The voice catalog as currently known. May be empty until loaded.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Resolves once the voice catalog has been loaded.
    async fn voices_ready(&self);

    /// Speak text, resolving when the utterance ends.
    async fn speak(&self, text: &str, options: &SpeechOptions) -> CoreResult<()>;
}
