//! Gemini `generateContent` client
//!
//! Sends a single user turn to the Generative Language API and returns the
//! text of the first part of the first candidate as a JSON string literal,
//! which `output::unquote` turns back into the exact text.

use super::http::{build_client, send_json};
use super::{display_or_default, LLMProvider};
use crate::config::GeminiConfig;
use crate::error::{Error, LlmError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Returned in place of an answer when the model produced a candidate with no content
pub const EMPTY_CANDIDATE_MESSAGE: &str = "Failed to generate message. Try again";

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model_name: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn from_config(config: &GeminiConfig) -> Result<Self, Error> {
        Ok(Self {
            api_key: config.resolved_api_key()?,
            model_name: config.model_name.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http: build_client("gemini", config.timeout_secs)?,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        )
    }

    /// Query Gemini and return the response text, JSON-encoded
    pub async fn query(&self, prompt: &str) -> Result<String, Error> {
        let body = GenerateContentRequest::new(prompt, self.temperature, self.max_output_tokens);

        debug!(
            "POST {} [model: {}, prompt: {} chars]",
            self.endpoint(),
            self.model_name,
            prompt.len()
        );

        let request = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response: GenerateContentResponse = send_json("gemini", request).await?;
        let text = encode_answer(&response.into_text()?)?;

        debug!("Gemini query completed successfully");
        Ok(text)
    }
}

fn encode_answer(text: &str) -> Result<String, Error> {
    serde_json::to_string(text).map_err(|e| {
        Error::Llm(LlmError::InvalidResponse {
            model: "gemini".to_string(),
            details: e.to_string(),
        })
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "GenerationConfig::is_empty")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none()
    }
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, temperature: Option<f32>, max_output_tokens: Option<u32>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    pub fn into_text(self) -> Result<String, Error> {
        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            Error::Llm(LlmError::InvalidResponse {
                model: "gemini".to_string(),
                details: "no candidates returned".to_string(),
            })
        })?;

        let Some(first_part) = candidate.content.and_then(|c| c.parts.into_iter().next()) else {
            debug!(
                "Gemini candidate had no content (finish reason: {:?})",
                candidate.finish_reason
            );
            return Ok(EMPTY_CANDIDATE_MESSAGE.to_string());
        };

        first_part.text.ok_or_else(|| {
            Error::Llm(LlmError::InvalidResponse {
                model: "gemini".to_string(),
                details: "first part has no text".to_string(),
            })
        })
    }
}

#[async_trait::async_trait]
impl LLMProvider for GeminiClient {
    async fn query(&self, prompt: &str) -> Result<String, Error> {
        self.query(prompt).await
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Model Name", self.model_name.clone()),
            ("Temperature", display_or_default(self.temperature)),
            ("Max Output Tokens", display_or_default(self.max_output_tokens)),
        ]
    }
}
