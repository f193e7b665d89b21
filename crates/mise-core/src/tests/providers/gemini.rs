use crate::{
    MiseError, Photo, UnconfiguredGeneration,
    ports::{GenerationPort, GenerationRequest},
    providers::gemini::{GenerateResponse, reply_text, request_body},
};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\0";

/// WHAT: A photo is sent as a base64 inline part after the prompt
/// WHY: Gemini reads image parts in `inline_data`, not as URLs
#[test]
#[allow(clippy::unwrap_used)]
fn given_request_with_photo_when_building_body_then_text_then_inline_data() {
    // Given: A prompt with a PNG
    let photo = Photo::from_bytes(PNG_MAGIC.to_vec()).unwrap();
    let request = GenerationRequest::with_image("What is in my fridge?", photo);

    // When: Serializing the body
    let body = serde_json::to_value(request_body(&request)).unwrap();

    // Then: Two parts, text first
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["text"], "What is in my fridge?");
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
    assert_eq!(parts[1]["inline_data"]["data"], "iVBORw0KGgoAAAAA");
}

/// WHAT: Text-only requests carry a single part
/// WHY: An empty image part is rejected by the API
#[test]
#[allow(clippy::unwrap_used)]
fn given_text_request_when_building_body_then_single_part() {
    // Given / When
    let body = serde_json::to_value(request_body(&GenerationRequest::text("hi"))).unwrap();

    // Then
    assert_eq!(body["contents"][0]["parts"].as_array().map(Vec::len), Some(1));
}

/// WHAT: Reply parts of the first candidate are joined
/// WHY: Long answers arrive split across parts
#[test]
#[allow(clippy::unwrap_used)]
fn given_multi_part_reply_when_extracting_then_joined() {
    // Given: A response with two parts
    let response: GenerateResponse = serde_json::from_str(
        r#"{"candidates":[{"content":{"parts":[{"text":"Whisk "},{"text":"gently."}]}}]}"#,
    )
    .unwrap();

    // When / Then
    assert_eq!(reply_text(response).unwrap(), "Whisk gently.");
}

/// WHAT: A blocked or empty reply is a generation failure
/// WHY: Safety-filtered responses have no candidates
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_candidates_when_extracting_then_generation_failed() {
    // Given: An empty response
    let response: GenerateResponse = serde_json::from_str("{}").unwrap();

    // When / Then
    assert!(matches!(
        reply_text(response),
        Err(MiseError::GenerationFailed { .. })
    ));
}

/// WHAT: Without an API key every call fails with a hint
/// WHY: The app must still start and tell the user what to configure
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unconfigured_generation_when_generating_then_error_names_key() {
    // Given / When
    let result = UnconfiguredGeneration
        .generate(GenerationRequest::text("hello"))
        .await;

    // Then
    let error = result.unwrap_err();
    assert!(matches!(error, MiseError::GenerationFailed { .. }));
    assert!(error.to_string().contains("GEMINI_API_KEY"));
}
