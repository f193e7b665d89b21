use crate::narration::system_speech::{parse_espeak_voices, parse_say_voices};

/// WHAT: espeak-ng voice listings yield name and language
/// WHY: The preferred voice heuristic needs both
#[test]
fn given_espeak_listing_when_parsing_then_voices_extracted() {
    // Given: A trimmed `espeak-ng --voices` listing
    let listing = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
";

    // When: Parsing
    let voices = parse_espeak_voices(listing);

    // Then: Two voices with languages
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[1].name, "English_(America)");
    assert_eq!(voices[1].language.as_deref(), Some("en-us"));
}

/// WHAT: `say -v ?` listings keep multi-word names
/// WHY: macOS voices like "Bad News" contain spaces
#[test]
fn given_say_listing_when_parsing_then_names_with_spaces_kept() {
    // Given: A trimmed `say -v ?` listing
    let listing = "\
Alex                en_US    # Most people recognize me by my voice.
Bad News            en_US    # The light you see at the end of the tunnel is the headlamp.
Amelie              fr_CA    # Bonjour, je m'appelle Amelie.
";

    // When: Parsing
    let voices = parse_say_voices(listing);

    // Then: Three voices, language normalised
    assert_eq!(voices.len(), 3);
    assert_eq!(voices[1].name, "Bad News");
    assert_eq!(voices[2].language.as_deref(), Some("fr-CA"));
}
