//! OpenAI text-to-speech client.

use crate::{CoreResult, MiseError, ports::RemoteSynthesisPort};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

/// Default API host.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Default speech model.
pub const DEFAULT_SPEECH_MODEL: &str = "gpt-4o-mini-tts";
/// Default voice.
pub const DEFAULT_SPEECH_VOICE: &str = "alloy";
/// Longest input the endpoint accepts.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 4096;

/// Remote synthesis through `/v1/audio/speech`, returning MP3 bytes.
#[derive(Debug, Clone)]
pub struct OpenAiSpeechClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    speed: f32,
    max_input_chars: usize,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
}

impl OpenAiSpeechClient {
    /// Create a client with the default model and voice.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_SPEECH_MODEL.to_string(),
            voice: DEFAULT_SPEECH_VOICE.to_string(),
            speed: 1.0,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    /// Use a different model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different voice.
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Speaking speed, 1.0 is normal.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Use a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Truncate input past this many characters.
    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }
}

#[async_trait]
impl RemoteSynthesisPort for OpenAiSpeechClient {
    #[instrument(skip(self, text), fields(model = %self.model, voice = %self.voice))]
    async fn synthesize(&self, text: &str) -> CoreResult<Vec<u8>> {
        let input = truncate_chars(text, self.max_input_chars);

        let request = SpeechRequest {
            model: &self.model,
            input,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MiseError::synthesis(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        debug!(bytes = audio.len(), "Speech synthesized");
        Ok(audio.to_vec())
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
