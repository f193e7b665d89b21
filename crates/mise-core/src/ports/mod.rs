//! Capability interfaces for the runtime-specific primitives.
//!
//! The controller, assistant and narration service only see these traits,
//! so any of them can be replaced by a test double.

mod capture;
mod generation;
mod speech;

pub use {
    capture::{
        CaptureErrorKind, CaptureEvent, CaptureMode, CapturePort, CaptureSink, CaptureSubscription,
    },
    generation::{GenerationPort, GenerationRequest},
    speech::{AudioSinkPort, LocalSpeechPort, RemoteSynthesisPort, SpeechOptions, VoiceInfo},
};
