//! Google Gemini `generateContent` client.

use crate::{
    CoreResult, MiseError,
    ports::{GenerationPort, GenerationRequest},
};

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Default API host.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// Generation through the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client for the default host and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    /// Use a different model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model name in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationPort for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model, image = request.image.is_some()))]
    async fn generate(&self, request: GenerationRequest) -> CoreResult<String> {
        let body = request_body(&request);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MiseError::generation(format!("Gemini error {status}: {body}")));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = reply_text(parsed)?;

        debug!(chars = text.len(), "Gemini reply received");
        Ok(text)
    }
}

/// Prompt text first, then the inline photo if any.
pub(crate) fn request_body(request: &GenerationRequest) -> GenerateRequest<'_> {
    let mut parts = vec![Part::Text {
        text: &request.prompt,
    }];
    if let Some(image) = &request.image {
        parts.push(Part::Image {
            inline_data: InlineData {
                mime_type: image.mime_type(),
                data: base64::engine::general_purpose::STANDARD.encode(image.bytes()),
            },
        });
    }

    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

/// Text of the first candidate, all parts joined.
pub(crate) fn reply_text(response: GenerateResponse) -> CoreResult<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| MiseError::generation("Gemini returned no candidates"))
}

/// Stand-in used when no API key is configured; every call fails with a
/// message telling the user what to set.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGeneration;

#[async_trait]
impl GenerationPort for UnconfiguredGeneration {
    async fn generate(&self, _request: GenerationRequest) -> CoreResult<String> {
        Err(MiseError::generation(
            "no Gemini API key configured (set GEMINI_API_KEY or [generation].api_key)",
        ))
    }
}
