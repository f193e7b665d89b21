use crate::config::{Config, default_true};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Whisper model configuration for microphone capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhisperConfig {
    /// Path to the Whisper model file (e.g., ggml-base.en.bin).
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Use GPU for inference if a GPU backend was compiled in (Metal/Vulkan).
    #[serde(default = "default_true")]
    pub use_gpu: bool,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            use_gpu: true,
        }
    }
}

fn default_model_path() -> PathBuf {
    Config::data_dir()
        .unwrap_or_default()
        .join("models")
        .join("ggml-base.en.bin")
}
