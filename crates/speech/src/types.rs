use base64::Engine;
use bytes::Bytes;
use hush_core::{GatewayError, ModelCandidate, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPEED: f64 = 0.7;
pub const DEFAULT_FORMAT: &str = "mp3";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Text to synthesize plus voice parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub text: String,
    /// Speech speed multiplier
    pub speed: f64,
    /// Output audio format (e.g. "mp3")
    pub format: String,
    pub language: String,
}

impl GenerationRequest {
    /// Request with default speed, format and language
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` if `text` is empty or whitespace
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(GatewayError::invalid_input("text is required (string)"));
        }

        Ok(Self {
            text,
            speed: DEFAULT_SPEED,
            format: DEFAULT_FORMAT.to_owned(),
            language: DEFAULT_LANGUAGE.to_owned(),
        })
    }

    /// Apply caller supplied overrides
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` for a non-positive speed or an empty format
    pub fn with_options(mut self, options: AudioOptions) -> Result<Self> {
        options.validate()?;

        if let Some(speed) = options.speed {
            self.speed = speed;
        }

        if let Some(format) = options.format {
            self.format = format;
        }

        if let Some(language) = options.language.filter(|language| !language.trim().is_empty()) {
            self.language = language;
        }

        Ok(self)
    }
}

/// Optional voice parameters accepted from callers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioOptions {
    pub speed: Option<f64>,
    pub format: Option<String>,
    pub language: Option<String>,
}

impl AudioOptions {
    /// Check the overrides without building a request
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` for a non-positive speed or an empty format
    pub fn validate(&self) -> Result<()> {
        if let Some(speed) = self.speed.filter(|speed| !speed.is_finite() || *speed <= 0.0) {
            return Err(GatewayError::invalid_input(format!("speed must be a positive number, got {speed}")));
        }

        if self.format.as_deref().is_some_and(|format| format.trim().is_empty()) {
            return Err(GatewayError::invalid_input("format must not be empty"));
        }

        Ok(())
    }
}

/// Inbound body of `POST /api/speech`
#[derive(Debug, Deserialize)]
pub struct SpeechPayload {
    pub text: Option<String>,
    /// Configured provider name, the first provider when absent
    pub provider: Option<String>,
    #[serde(flatten)]
    pub options: AudioOptions,
}

/// Successful, provider independent audio outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalAudio {
    /// Audio hosted by the provider, playable directly by a client
    Redirect { url: String },
    /// Audio bytes returned in the response
    Inline { bytes: Bytes, mime_type: String },
}

impl CanonicalAudio {
    /// JSON form sent to the browser, inline audio is base64 encoded
    pub fn into_body(self) -> AudioBody {
        match self {
            Self::Redirect { url } => AudioBody::Redirect { audio_url: url },
            Self::Inline { bytes, mime_type } => AudioBody::Inline {
                audio: base64::engine::general_purpose::STANDARD.encode(&bytes),
                content_type: mime_type,
            },
        }
    }
}

/// Outbound audio body: `{audioUrl}` or `{audio, contentType}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AudioBody {
    Redirect {
        #[serde(rename = "audioUrl")]
        audio_url: String,
    },
    Inline {
        audio: String,
        #[serde(rename = "contentType")]
        content_type: String,
    },
}

/// Body of `GET /api/voices`
#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub provider: String,
    pub count: usize,
    pub voices: Vec<ModelCandidate>,
}

/// Readiness of one speech provider, without secrets
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: &'static str,
    pub base_url: String,
    pub has_credential: bool,
    pub ready: bool,
    /// Settings that must be provided before the provider can be used
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
}
