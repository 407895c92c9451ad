//! Mapping of raw provider responses into [`CanonicalAudio`]
//!
//! Providers answer with a redirect URL inside JSON, base64 audio inside
//! JSON, or a raw audio stream. The normalizer hides that behind one
//! outcome. Field lookup is table driven so a new provider shape only needs
//! new [`FieldRule`]s.

use base64::Engine;
use hush_config::ResponseFieldsConfig;
use hush_core::{ErrorKind, GatewayError, RawResponse, Result};
use serde_json::{Value, json};

use crate::types::CanonicalAudio;

/// MIME type assumed for base64 audio found inside JSON
pub const INLINE_JSON_MIME: &str = "audio/mpeg";

/// Extraction rule: a JSON pointer to a non-empty string field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pointer: String,
}

impl FieldRule {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
        }
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    pub fn extract<'a>(&self, json: &'a Value) -> Option<&'a str> {
        json.pointer(&self.pointer)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Ordered field tables for one provider
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    url_rules: Vec<FieldRule>,
    audio_rules: Vec<FieldRule>,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::from_config(&ResponseFieldsConfig::default())
    }
}

impl ResponseNormalizer {
    pub fn from_config(config: &ResponseFieldsConfig) -> Self {
        let rules = |fields: &[String]| fields.iter().map(FieldRule::new).collect();

        Self {
            url_rules: rules(&config.url_fields),
            audio_rules: rules(&config.audio_fields),
        }
    }

    /// Classify a response
    ///
    /// Pure: the same status, content type and body always produce the same
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns the `Failure` outcome as a [`GatewayError`]
    pub fn normalize(&self, response: &RawResponse) -> Result<CanonicalAudio> {
        let content_type = response.content_type.to_ascii_lowercase();

        if content_type.contains("application/json") {
            self.normalize_json(response)
        } else if content_type.starts_with("audio/") {
            normalize_audio(response)
        } else {
            Err(GatewayError::new(
                ErrorKind::UnexpectedContentType,
                format!("unexpected content-type '{}'", response.content_type),
            )
            .with_status(response.status)
            .with_detail(Value::String(response.body_prefix())))
        }
    }

    fn normalize_json(&self, response: &RawResponse) -> Result<CanonicalAudio> {
        let status = response.status;
        let json: Value = serde_json::from_slice(&response.body).map_err(|e| {
            GatewayError::new(ErrorKind::InvalidResponse, format!("invalid JSON from provider: {e}"))
                .with_status(status)
                .with_detail(Value::String(response.body_prefix()))
        })?;

        if !response.is_success() {
            return Err(
                GatewayError::new(ErrorKind::UpstreamError, format!("provider returned status {status}"))
                    .with_status(status)
                    .with_detail(json),
            );
        }

        if let Some(url) = self.url_rules.iter().find_map(|rule| rule.extract(&json)) {
            return Ok(CanonicalAudio::Redirect { url: url.to_owned() });
        }

        if let Some((rule, encoded)) = self
            .audio_rules
            .iter()
            .find_map(|rule| rule.extract(&json).map(|encoded| (rule, encoded)))
        {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| {
                    GatewayError::new(
                        ErrorKind::InvalidResponse,
                        format!("field '{}' is not valid base64", rule.pointer()),
                    )
                    .with_status(status)
                    .with_detail(json!({"field": rule.pointer(), "error": e.to_string()}))
                })?;

            return Ok(CanonicalAudio::Inline {
                bytes: bytes.into(),
                mime_type: INLINE_JSON_MIME.to_owned(),
            });
        }

        Err(
            GatewayError::new(ErrorKind::UnexpectedShape, "unexpected JSON shape from provider")
                .with_status(status)
                .with_detail(json),
        )
    }
}

fn normalize_audio(response: &RawResponse) -> Result<CanonicalAudio> {
    if !response.is_success() {
        return Err(GatewayError::new(
            ErrorKind::UpstreamError,
            format!("provider returned status {} with audio body", response.status),
        )
        .with_status(response.status)
        .with_detail(json!({
            "contentType": response.content_type,
            "size": response.body.len(),
        })));
    }

    Ok(CanonicalAudio::Inline {
        bytes: response.body.clone(),
        mime_type: response.content_type.clone(),
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use hush_core::BODY_PREFIX_CHARS;

    use super::*;

    fn json_response(status: u16, body: &Value) -> RawResponse {
        RawResponse::new(status, "application/json", body.to_string())
    }

    #[test]
    fn redirect_url() {
        let outcome = ResponseNormalizer::default()
            .normalize(&json_response(200, &json!({"audioUrl": "https://x/y.mp3"})))
            .unwrap();

        assert_eq!(
            outcome,
            CanonicalAudio::Redirect {
                url: "https://x/y.mp3".to_owned()
            }
        );
    }

    #[test]
    fn inline_base64() {
        let outcome = ResponseNormalizer::default()
            .normalize(&json_response(200, &json!({"audio": "QQ==", "format": "mp3"})))
            .unwrap();

        assert_eq!(
            outcome,
            CanonicalAudio::Inline {
                bytes: Bytes::from_static(&[0x41]),
                mime_type: "audio/mpeg".to_owned()
            }
        );
    }

    #[test]
    fn raw_audio_body() {
        let response = RawResponse::new(200, "audio/mpeg", vec![0x01, 0x02]);
        let outcome = ResponseNormalizer::default().normalize(&response).unwrap();

        assert_eq!(
            outcome,
            CanonicalAudio::Inline {
                bytes: Bytes::from_static(&[0x01, 0x02]),
                mime_type: "audio/mpeg".to_owned()
            }
        );
    }

    #[test]
    fn json_error_status() {
        let err = ResponseNormalizer::default()
            .normalize(&json_response(404, &json!({"message": "not found"})))
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.status, 404);
        assert_eq!(err.detail, json!({"message": "not found"}));
    }

    #[test]
    fn html_is_unexpected_content_type() {
        let html = format!("<html>{}</html>", "x".repeat(500));
        let err = ResponseNormalizer::default()
            .normalize(&RawResponse::new(200, "text/html", html.clone()))
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnexpectedContentType);
        assert_eq!(err.status, 200);
        let expected: String = html.chars().take(BODY_PREFIX_CHARS).collect();
        assert_eq!(err.detail, Value::String(expected));
    }

    #[test]
    fn missing_content_type_is_unexpected() {
        let err = ResponseNormalizer::default()
            .normalize(&RawResponse::new(200, "", "binary?"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedContentType);
    }

    #[test]
    fn url_rules_win_over_audio_rules() {
        let body = json!({"audio": "QQ==", "data": {"url": "https://cdn/a.mp3"}});
        let outcome = ResponseNormalizer::default().normalize(&json_response(200, &body)).unwrap();
        assert_eq!(
            outcome,
            CanonicalAudio::Redirect {
                url: "https://cdn/a.mp3".to_owned()
            }
        );
    }

    #[test]
    fn nested_fields_are_searched_in_order() {
        let body = json!({"url": "", "result": {"audioUrl": "https://r/1.mp3"}});
        let outcome = ResponseNormalizer::default().normalize(&json_response(200, &body)).unwrap();
        assert_eq!(
            outcome,
            CanonicalAudio::Redirect {
                url: "https://r/1.mp3".to_owned()
            }
        );

        let body = json!({"data": {"audio": "AQID"}});
        let outcome = ResponseNormalizer::default().normalize(&json_response(200, &body)).unwrap();
        assert_eq!(
            outcome,
            CanonicalAudio::Inline {
                bytes: Bytes::from_static(&[1, 2, 3]),
                mime_type: INLINE_JSON_MIME.to_owned()
            }
        );
    }

    #[test]
    fn unknown_shape_is_surfaced() {
        let body = json!({"job": {"id": "123", "state": "queued"}});
        let err = ResponseNormalizer::default().normalize(&json_response(200, &body)).unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnexpectedShape);
        assert_eq!(err.detail, body);
    }

    #[test]
    fn invalid_json_keeps_body_prefix() {
        let err = ResponseNormalizer::default()
            .normalize(&RawResponse::new(500, "application/json", "{not json"))
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidResponse);
        assert_eq!(err.status, 500);
        assert_eq!(err.detail, json!("{not json"));
    }

    #[test]
    fn invalid_base64_is_invalid_response() {
        let err = ResponseNormalizer::default()
            .normalize(&json_response(200, &json!({"audio_base64": "not base64!"})))
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidResponse);
        assert_eq!(err.detail["field"], "/audio_base64");
    }

    #[test]
    fn audio_error_reports_size() {
        let err = ResponseNormalizer::default()
            .normalize(&RawResponse::new(503, "audio/wav", vec![0_u8; 12]))
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.detail, json!({"contentType": "audio/wav", "size": 12}));
    }

    #[test]
    fn base64_payload_round_trips() {
        let original: Vec<u8> = (0..=255).collect();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&original);
        let outcome = ResponseNormalizer::default()
            .normalize(&json_response(200, &json!({"audio": encoded})))
            .unwrap();

        let CanonicalAudio::Inline { bytes, .. } = outcome else {
            panic!("expected inline audio");
        };
        assert_eq!(bytes.as_ref(), original.as_slice());
    }

    #[test]
    fn identical_inputs_give_identical_outcomes() {
        let normalizer = ResponseNormalizer::default();
        let responses = [
            json_response(200, &json!({"audioUrl": "https://x/y.mp3"})),
            json_response(422, &json!({"detail": "bad voice"})),
            RawResponse::new(200, "text/plain", "hello"),
        ];

        for response in &responses {
            let first = normalizer.normalize(response);
            let second = normalizer.normalize(response);
            match (first, second) {
                (Ok(a), Ok(b)) => assert_eq!(a, b),
                (Err(a), Err(b)) => {
                    assert_eq!(a.kind, b.kind);
                    assert_eq!(a.status, b.status);
                    assert_eq!(a.detail, b.detail);
                }
                _ => panic!("outcomes differ for {response:?}"),
            }
        }
    }

    #[test]
    fn custom_table_changes_lookup() {
        let normalizer = ResponseNormalizer::from_config(&ResponseFieldsConfig {
            url_fields: vec!["/output/link".to_owned()],
            audio_fields: Vec::new(),
        });

        let outcome = normalizer
            .normalize(&json_response(200, &json!({"output": {"link": "https://o/1.mp3"}})))
            .unwrap();
        assert_eq!(
            outcome,
            CanonicalAudio::Redirect {
                url: "https://o/1.mp3".to_owned()
            }
        );

        let err = normalizer
            .normalize(&json_response(200, &json!({"audioUrl": "https://x/y.mp3"})))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedShape);
    }
}
