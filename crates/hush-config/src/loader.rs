use std::path::Path;

use anyhow::Context;

use crate::{Config, ModelSelectionConfig};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).context("config variable expansion failed")?;
        let config: Self = toml::from_str(&expanded).context("failed to parse config")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// Missing API keys are not an error here: a provider without credentials
    /// only fails once it is invoked.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.timeout_secs == 0 {
            anyhow::bail!("upstream.timeout_secs must be greater than 0");
        }

        self.validate_narration()?;
        self.validate_speech()?;

        Ok(())
    }

    fn validate_narration(&self) -> anyhow::Result<()> {
        let narration = &self.narration;

        if narration.fallback_text.trim().is_empty() {
            anyhow::bail!("narration.fallback_text must not be empty");
        }

        if !narration.user_template.contains("{mood}") {
            anyhow::bail!("narration.user_template must contain the {{mood}} placeholder");
        }

        if narration.max_tokens == 0 {
            anyhow::bail!("narration.max_tokens must be greater than 0");
        }

        validate_headers("narration", narration.headers.iter())?;

        if let Some(models) = &narration.models {
            validate_selection("narration.models", models)?;
        }

        Ok(())
    }

    fn validate_speech(&self) -> anyhow::Result<()> {
        for (name, provider) in &self.speech.providers {
            let scope = format!("speech.providers.{name}");

            validate_headers(&scope, provider.headers.iter())?;

            if let Some(voices) = &provider.voices {
                validate_selection(&format!("{scope}.voices"), voices)?;
            }

            for pointer in provider.response_fields().pointers() {
                if !pointer.starts_with('/') {
                    anyhow::bail!("{scope}.response field '{pointer}' must be a JSON pointer starting with '/'");
                }
            }
        }

        Ok(())
    }
}

fn validate_selection(scope: &str, selection: &ModelSelectionConfig) -> anyhow::Result<()> {
    if let Some(pattern) = &selection.fallback_pattern {
        regex::Regex::new(pattern).with_context(|| format!("invalid {scope}.fallback_pattern"))?;
    }

    Ok(())
}

fn validate_headers<'a>(scope: &str, headers: impl Iterator<Item = (&'a String, &'a String)>) -> anyhow::Result<()> {
    for (name, value) in headers {
        http::HeaderName::try_from(name.as_str()).with_context(|| format!("invalid header name '{name}' in {scope}"))?;
        http::HeaderValue::try_from(value.as_str())
            .with_context(|| format!("invalid value for header '{name}' in {scope}"))?;
    }

    Ok(())
}
