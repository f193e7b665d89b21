use crate::providers::truncate_chars;

/// WHAT: Text longer than the limit is cut to a character count
/// WHY: The speech endpoint rejects oversized input
#[test]
fn given_long_text_when_truncating_then_prefix_of_max_chars() {
    // Given / When / Then
    assert_eq!(truncate_chars("Whisk the eggs", 5), "Whisk");
    assert_eq!(truncate_chars("short", 4096), "short");
}

/// WHAT: Truncation never splits a multi-byte character
/// WHY: Slicing inside a UTF-8 sequence panics
#[test]
fn given_multibyte_text_when_truncating_then_char_boundary_kept() {
    // Given: Accented text
    let text = "crème brûlée";

    // When
    let cut = truncate_chars(text, 4);

    // Then
    assert_eq!(cut, "crèm");
}
