use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::selection::ModelSelectionConfig;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a whisper ASMR artist. Return multiple, short, simple sentences in a calming \
bedtime voice (no quotes, no emojis), suitable to be read aloud in a slow, soft voice. Use ellipses (...) to indicate \
necessary pauses for a gentle, measured pace. Keep the response under 100 words. Do not use terms of endearment, but \
do be direct, similar to 'let your eyes flutter shut, and drift off to sleep.'";

const DEFAULT_USER_TEMPLATE: &str =
    "Mood: {mood}. Create a gentle quiet whisper-style experience to help someone fall asleep.";

const DEFAULT_FALLBACK_TEXT: &str = "Soft ambient hush for deep rest.";

/// Text generation provider configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NarrationConfig {
    /// Provider protocol
    #[serde(rename = "type", default)]
    pub provider_type: NarrationProviderType,
    /// API key, only required once narration is requested
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Messages endpoint path
    #[serde(default = "default_path")]
    pub path: String,
    /// Fixed model ID; skips inventory selection when set
    #[serde(default)]
    pub model: Option<String>,
    /// Inventory based model selection
    #[serde(default = "default_models")]
    pub models: Option<ModelSelectionConfig>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Fixed system instruction
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// User message, `{mood}` is replaced with the requested mood
    #[serde(default = "default_user_template")]
    pub user_template: String,
    /// Returned when the provider answers with empty text
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            provider_type: NarrationProviderType::default(),
            api_key: None,
            base_url: None,
            path: default_path(),
            model: None,
            models: default_models(),
            headers: IndexMap::new(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            user_template: default_user_template(),
            fallback_text: default_fallback_text(),
        }
    }
}

/// Supported text generation protocols
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationProviderType {
    /// Anthropic Messages API
    #[default]
    Anthropic,
}

fn default_path() -> String {
    "/v1/messages".to_owned()
}

#[allow(clippy::unnecessary_wraps)]
fn default_models() -> Option<ModelSelectionConfig> {
    Some(ModelSelectionConfig {
        inventory_path: "/v1/models".to_owned(),
        preferred: vec![
            "claude-3-5-sonnet-latest".to_owned(),
            "claude-3-sonnet-latest".to_owned(),
            "claude-3-haiku-20240307".to_owned(),
            "claude-3-haiku-latest".to_owned(),
        ],
        fallback_pattern: Some("(?i)^claude-3".to_owned()),
    })
}

const fn default_max_tokens() -> u32 {
    180
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_owned()
}

fn default_user_template() -> String {
    DEFAULT_USER_TEMPLATE.to_owned()
}

fn default_fallback_text() -> String {
    DEFAULT_FALLBACK_TEXT.to_owned()
}
