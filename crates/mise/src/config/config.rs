//! Configuration management for mise.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, environment overrides for API keys, lazy validation, and atomic
//! write operations.

use crate::{
    AppError, AppResult,
    config::{
        AssistantConfig, GEMINI_API_KEY_ENV, GenerationConfig, NarrationConfig,
        OPENAI_API_KEY_ENV, VoiceConfig, WhisperConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Recipe generation model.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Cooking question model override.
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Spoken replies.
    #[serde(default)]
    pub narration: NarrationConfig,
    /// Voice input.
    #[serde(default)]
    pub voice: VoiceConfig,
    /// Whisper model for microphone capture.
    #[serde(default)]
    pub whisper: WhisperConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found, then
    /// apply API keys from the environment.
    ///
    /// Neither the Whisper model nor the API keys are validated here; a
    /// missing key is reported when it is first needed.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let config = Self::read_from(&config_path)?;
            info!(config_path = ?config_path, "Configuration loaded");
            config
        } else {
            info!("No config found, creating default");
            Self::create_default(&config_path)?
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a TOML document. Missing sections and fields take defaults.
    #[track_caller]
    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Serialize to pretty TOML.
    #[track_caller]
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Override API keys with non-empty values from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(GEMINI_API_KEY_ENV) {
            debug!("Gemini API key taken from environment");
            self.generation.api_key = Some(key);
        }
        if let Some(key) = non_empty(OPENAI_API_KEY_ENV) {
            debug!("OpenAI API key taken from environment");
            self.narration.api_key = Some(key);
        }
    }

    /// Model for cooking questions: the assistant override, else the
    /// generation model.
    pub fn assistant_model(&self) -> &str {
        self.assistant
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(&self.generation.model)
    }

    /// Validate that the Whisper model file exists at the configured path.
    ///
    /// Only checked when the microphone backend is in use.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        if !self.whisper.model_path.exists() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Whisper model not found at: {:?}. Download a model or set [whisper].model_path.",
                    self.whisper.model_path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = self.to_toml()?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Read and parse a config file.
    #[track_caller]
    pub fn read_from(config_path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Self::from_toml(&contents)
    }

    /// Platform data directory, home of the Whisper model and the logs.
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "mise", "Mise")
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs().ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default(config_path: &Path) -> AppResult<Self> {
        let config = Config::default();
        config.save_to(config_path)?;

        warn!(
            model_path = ?config.whisper.model_path,
            "Default config created. Set GEMINI_API_KEY to generate recipes."
        );

        Ok(config)
    }
}
