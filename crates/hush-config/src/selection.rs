use serde::Deserialize;

/// How a provider picks a model or voice from its inventory
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSelectionConfig {
    /// Path of the inventory listing, relative to the provider base URL
    pub inventory_path: String,
    /// Model or voice IDs in order of preference
    #[serde(default)]
    pub preferred: Vec<String>,
    /// Regex matched against candidate IDs when no preferred ID is available
    #[serde(default)]
    pub fallback_pattern: Option<String>,
}

impl ModelSelectionConfig {
    /// Whether this configuration can choose an ID at all
    ///
    /// An inventory with no preferences and no pattern is only usable for
    /// listing.
    pub fn selects(&self) -> bool {
        !self.preferred.is_empty() || self.fallback_pattern.is_some()
    }
}

/// JSON pointers searched, in order, when a provider answers with JSON
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseFieldsConfig {
    /// Fields holding a playable audio URL
    pub url_fields: Vec<String>,
    /// Fields holding base64 encoded audio
    pub audio_fields: Vec<String>,
}

impl ResponseFieldsConfig {
    /// Field table covering the redirect and inline shapes seen from Fish Audio
    pub fn fish_audio() -> Self {
        Self {
            url_fields: to_owned(&["/audioUrl", "/url", "/result/audioUrl", "/data/url"]),
            audio_fields: to_owned(&["/audio", "/audio_base64", "/result/audio", "/data/audio"]),
        }
    }

    /// Narrower table used for Vapi agents
    pub fn vapi() -> Self {
        Self {
            url_fields: to_owned(&["/audioUrl", "/url"]),
            audio_fields: to_owned(&["/audio", "/audio_base64", "/result/audio"]),
        }
    }

    pub(crate) fn pointers(&self) -> impl Iterator<Item = &str> {
        self.url_fields.iter().chain(&self.audio_fields).map(String::as_str)
    }
}

impl Default for ResponseFieldsConfig {
    fn default() -> Self {
        Self::fish_audio()
    }
}

fn to_owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|&field| field.to_owned()).collect()
}
