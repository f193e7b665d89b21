use crate::config::DEFAULT_RECIPE_COUNT;

use mise_core::providers::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use serde::{Deserialize, Serialize};

/// Recipe generation model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Gemini API key. `GEMINI_API_KEY` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for recipes and ingredient detection.
    #[serde(default = "default_model")]
    pub model: String,

    /// API host.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Recipes requested per generation.
    #[serde(default = "default_recipe_count")]
    pub recipe_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            recipe_count: default_recipe_count(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_recipe_count() -> usize {
    DEFAULT_RECIPE_COUNT
}
