use crate::ports::VoiceInfo;

/// Name fragments that mark a higher quality voice.
pub const QUALITY_MARKERS: [&str; 5] = ["natural", "neural", "premium", "enhanced", "google"];

/// Pick the voice to narrate with.
///
/// English voices with a quality marker in their name win, then any English
/// voice, then whatever comes first. `None` only for an empty catalog.
pub fn select_preferred_voice(voices: &[VoiceInfo]) -> Option<&VoiceInfo> {
    let english = || voices.iter().filter(|v| is_english(v));

    english()
        .find(|v| has_quality_marker(&v.name))
        .or_else(|| english().next())
        .or_else(|| voices.first())
}

fn is_english(voice: &VoiceInfo) -> bool {
    match &voice.language {
        Some(language) => language.to_ascii_lowercase().starts_with("en"),
        None => voice.name.to_ascii_lowercase().starts_with("en"),
    }
}

fn has_quality_marker(name: &str) -> bool {
    let lower = name.to_lowercase();
    QUALITY_MARKERS.iter().any(|marker| lower.contains(marker))
}
