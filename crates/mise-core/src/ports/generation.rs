use crate::{CoreResult, recipe::Photo};

use async_trait::async_trait;

/// A single prompt for the generation model, optionally with a photo.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Prompt text.
    pub prompt: String,
    /// Inline image sent with the prompt.
    pub image: Option<Photo>,
}

impl GenerationRequest {
    /// Text-only request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    /// Request with an inline photo.
    pub fn with_image(prompt: impl Into<String>, image: Photo) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// A hosted text/vision model.
///
/// The reply is opaque free-form text; no schema is enforced on it.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Send the request and return the model's text.
    async fn generate(&self, request: GenerationRequest) -> CoreResult<String>;
}
