use serde::{Deserialize, Serialize};

/// Cooking question model settings.
///
/// Shares the generation key and host; only the model can differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Model for questions and progress photos. Falls back to the
    /// generation model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
