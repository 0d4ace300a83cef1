//! Remote text generator.
//!
//! [`TextGenerator`] is the seam the resolver calls through. Production uses
//! [`GeminiGenerator`]; tests plug in canned replies.

use crate::config::GeneratorConfig;
use crate::error::RelayError;
use crate::logging::preview;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Longest error body kept from a failed generator call
const ERROR_BODY_LIMIT: usize = 300;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free text for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, RelayError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

// ============================================================================
// Gemini wire types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContentOut>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiContentOut {
    #[serde(default)]
    pub parts: Option<Vec<GeminiPartOut>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiPartOut {
    #[serde(default)]
    pub text: Option<String>,
}

/// Text of the first candidate, or why there is none
pub fn extract_candidate_text(response: &GeminiResponse) -> Result<String, RelayError> {
    let candidate = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .ok_or_else(|| {
            error!("No candidates");
            RelayError::NoCandidates
        })?;

    let finish = candidate.finish_reason.as_deref().unwrap_or("");
    debug!("Finish: {}", finish);
    match finish {
        "SAFETY" => return Err(RelayError::Blocked),
        "MAX_TOKENS" => warn!("Hit max tokens"),
        _ => {}
    }

    let parts = candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.as_ref())
        .ok_or_else(|| {
            error!("No content/parts");
            RelayError::InvalidStructure
        })?;

    let text = parts
        .first()
        .and_then(|p| p.text.as_deref())
        .ok_or_else(|| {
            error!("No text in parts");
            RelayError::EmptyResponse
        })?;

    Ok(text.trim().to_string())
}

// ============================================================================
// Gemini generator
// ============================================================================

pub struct GeminiGenerator {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
}

impl GeminiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, RelayError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(RelayError::MissingApiKey)?
            .to_string();

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http_client,
            url: config.generate_url(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            top_p: config.top_p,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_body(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                top_p: self.top_p,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let resp = self
            .http_client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let body = preview(&body, ERROR_BODY_LIMIT);
            error!("HTTP {}: {}", status.as_u16(), body);
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)?;
        let text = extract_candidate_text(&parsed)?;
        info!("Response: {}", preview(&text, 150));
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_text() {
        let r = response(
            r#"{"candidates":[{"content":{"parts":[{"text":"  {\"action\":\"maintain\"}\n"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_candidate_text(&r).unwrap(), r#"{"action":"maintain"}"#);
    }

    #[test]
    fn test_max_tokens_still_returns_text() {
        let r = response(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"action\":"}]},"finishReason":"MAX_TOKENS"}]}"#,
        );
        assert_eq!(extract_candidate_text(&r).unwrap(), r#"{"action":"#);
    }

    #[test]
    fn test_safety_block() {
        let r = response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(extract_candidate_text(&r), Err(RelayError::Blocked)));
    }

    #[test]
    fn test_no_candidates() {
        assert!(matches!(
            extract_candidate_text(&response("{}")),
            Err(RelayError::NoCandidates)
        ));
        assert!(matches!(
            extract_candidate_text(&response(r#"{"candidates":[]}"#)),
            Err(RelayError::NoCandidates)
        ));
    }

    #[test]
    fn test_missing_parts_and_text() {
        let r = response(r#"{"candidates":[{"content":{}}]}"#);
        assert!(matches!(extract_candidate_text(&r), Err(RelayError::InvalidStructure)));

        let r = response(r#"{"candidates":[{"content":{"parts":[]}}]}"#);
        assert!(matches!(extract_candidate_text(&r), Err(RelayError::EmptyResponse)));

        let r = response(r#"{"candidates":[{"content":{"parts":[{"inlineData":{}}]}}]}"#);
        assert!(matches!(extract_candidate_text(&r), Err(RelayError::EmptyResponse)));
    }

    #[test]
    fn test_request_body_shape() {
        let mut config = GeneratorConfig::default();
        config.api_key = Some("k".to_string());
        let generator = GeminiGenerator::new(&config).unwrap();
        let body = serde_json::to_value(generator.request_body("hello")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        assert!(body["generationConfig"]["topP"].is_number());
        assert_eq!(generator.model(), "gemini-2.0-flash-exp");
    }

    #[test]
    fn test_missing_api_key() {
        let config = GeneratorConfig::default();
        assert!(matches!(
            GeminiGenerator::new(&config),
            Err(RelayError::MissingApiKey)
        ));
    }
}
