mod narration_service;
pub(crate) mod system_speech;
mod voice_selection;

pub use {
    narration_service::{NarrationService, NarrationSettings},
    system_speech::SystemSpeech,
    voice_selection::{QUALITY_MARKERS, select_preferred_voice},
};
