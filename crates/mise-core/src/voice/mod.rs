mod controller;
mod restart_timer;
mod voice_session_state;
mod voice_settings;
mod wake_phrase;

pub(crate) use restart_timer::RestartTimer;

pub use {
    controller::{ControllerInput, VoiceHandle, VoiceNotice, VoiceSessionController},
    voice_session_state::{
        VoiceEffect, VoiceEvent, VoiceMode, VoicePhase, VoiceSessionState, VoiceStatus,
    },
    voice_settings::VoiceSettings,
    wake_phrase::{DEFAULT_WAKE_PATTERNS, WakePhraseMatcher},
};
