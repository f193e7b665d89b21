//! Native audio: microphone capture with local transcription, and speaker
//! playback of synthesized speech.

pub(crate) mod capture;
pub(crate) mod engine;
mod microphone;
pub(crate) mod playback;
mod recognizer;
mod resampler;
pub(crate) mod utterance_detector;

pub(crate) use {
    capture::AudioCapturer,
    engine::SttEngine,
    resampler::Resampler,
    utterance_detector::{Endpoint, UtteranceDetector},
};

pub use {
    microphone::MicrophoneCapture,
    playback::SpeakerPlayback,
    recognizer::{SpeechRecognizer, WHISPER_SAMPLE_RATE},
};
