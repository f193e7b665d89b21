use crate::{
    MiseError,
    recipe::{CookingTime, Dietary, DishType, Mood, Photo, Preferences},
};

/// WHAT: Toggling a selected mood removes it, others keep their order
/// WHY: Mood and dietary behave as sets driven by on/off chips
#[test]
fn given_selected_mood_when_toggling_again_then_removed() {
    // Given: Two moods selected
    let mut preferences = Preferences::default();
    preferences.toggle_mood(Mood::Spicy);
    preferences.toggle_mood(Mood::Sweet);

    // When: Toggling the first again
    preferences.toggle_mood(Mood::Spicy);

    // Then: Only the second remains
    assert_eq!(preferences.mood, vec![Mood::Sweet]);
}

/// WHAT: Dietary toggles follow the same set semantics
/// WHY: Duplicates would repeat constraints in the prompt
#[test]
fn given_dietary_toggled_twice_when_toggling_then_no_duplicates() {
    // Given: Empty preferences
    let mut preferences = Preferences::default();

    // When: Toggling vegan on, off and on
    preferences.toggle_dietary(Dietary::Vegan);
    preferences.toggle_dietary(Dietary::Vegan);
    preferences.toggle_dietary(Dietary::Vegan);

    // Then: Exactly one entry
    assert_eq!(preferences.dietary, vec![Dietary::Vegan]);
}

/// WHAT: Labels round-trip case-insensitively
/// WHY: Terminal commands and config use the labels
#[test]
fn given_labels_when_looking_up_then_options_found() {
    // Given / When / Then: Each lookup succeeds or rejects unknown text
    assert_eq!(CookingTime::from_label("2+HOURS"), Some(CookingTime::MoreThanTwoHours));
    assert_eq!(DishType::from_label(" main course "), Some(DishType::MainCourse));
    assert_eq!(Mood::from_label("comfort food"), Some(Mood::ComfortFood));
    assert_eq!(Dietary::from_label("dairy-free"), Some(Dietary::DairyFree));
    assert_eq!(Mood::from_label("umami"), None);
    assert_eq!(DishType::default(), DishType::MainCourse);
}

/// WHAT: Photos are sniffed from magic bytes
/// WHY: The model needs the right MIME type for inline data
#[test]
#[allow(clippy::unwrap_used)]
fn given_jpeg_bytes_when_wrapping_photo_then_mime_type_detected() {
    // Given: JPEG magic bytes
    let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0];

    // When: Wrapping them
    let photo = Photo::from_bytes(bytes).unwrap();

    // Then: image/jpeg
    assert_eq!(photo.mime_type(), "image/jpeg");
}

/// WHAT: Unknown bytes are rejected
/// WHY: Sending arbitrary files to a vision model wastes a request
#[test]
fn given_text_bytes_when_wrapping_photo_then_invalid_image() {
    // Given: Not an image
    let bytes = b"just some text".to_vec();

    // When: Wrapping them
    let result = Photo::from_bytes(bytes);

    // Then: InvalidImage
    assert!(matches!(result, Err(MiseError::InvalidImage { .. })));
}

/// WHAT: Either ingredient text or a photo is enough to generate
/// WHY: Generation requires something to cook from
#[test]
fn given_blank_text_and_no_photo_when_checking_source_then_false() {
    // Given: Whitespace ingredients
    let preferences = Preferences {
        ingredients: " \t".to_string(),
        ..Default::default()
    };

    // When / Then: No source
    assert!(!preferences.has_ingredient_source());
}
