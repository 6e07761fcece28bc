//! Text generator configuration from TOML (`[generation]` section)

use serde::{Deserialize, Serialize};

/// Raw generator configuration from TOML
///
/// # Example
///
/// ```toml
/// [generation]
/// base_url = "http://localhost:11434/v1"   # any OpenAI-compatible endpoint
/// model = "llama3.1"
/// api_key_env = "HELM_API_KEY"             # env var holding the key (optional)
/// timeout_seconds = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Base URL of the chat-completion API (without `/chat/completions`)
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Hard timeout per generation call
    pub timeout_seconds: u64,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1".to_string(),
            api_key_env: Some("HELM_API_KEY".to_string()),
            timeout_seconds: 30,
        }
    }
}

impl FileGenerationConfig {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
