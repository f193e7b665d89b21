//! Hosted model clients implementing the generation and synthesis ports.

pub(crate) mod gemini;
mod openai_speech;

pub use {
    gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiClient, UnconfiguredGeneration},
    openai_speech::{
        DEFAULT_MAX_INPUT_CHARS, DEFAULT_OPENAI_BASE_URL, DEFAULT_SPEECH_MODEL,
        DEFAULT_SPEECH_VOICE, OpenAiSpeechClient, truncate_chars,
    },
};
