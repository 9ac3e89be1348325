//! OpenAI chat-completions client
//!
//! Also owns the chat-completions wire types, which Azure OpenAI shares.

use super::http::{build_client, send_json};
use super::{display_or_default, LLMProvider};
use crate::config::{require, OpenAiConfig};
use crate::error::{Error, LlmError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Models this client accepts
pub const SUPPORTED_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-4-turbo", "gpt-4"];

/// OpenAI API client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, Error> {
        let model = require("openAI", "modelName", &config.model_name)?;
        let model = validate_model(&model)?;
        Ok(Self {
            api_key: config.resolved_api_key()?,
            model: model.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http: build_client("openai", config.timeout_secs)?,
        })
    }

    /// Query the chat-completions endpoint and return the first choice
    pub async fn query(&self, prompt: &str) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: Some(self.model.clone()),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("POST {} [model: {}, prompt: {} chars]", url, self.model, prompt.len());

        let request = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatCompletionResponse = send_json("openai", request).await?;
        let text = response.into_text("openai")?;

        debug!("OpenAI query completed successfully");
        Ok(text)
    }
}

/// Check a configured model name against [`SUPPORTED_MODELS`]
pub fn validate_model(name: &str) -> Result<&'static str, Error> {
    SUPPORTED_MODELS
        .iter()
        .copied()
        .find(|m| *m == name.trim())
        .ok_or_else(|| {
            Error::Llm(LlmError::UnsupportedModel {
                provider: "openai".to_string(),
                model: name.to_string(),
            })
        })
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Absent for Azure, where the deployment picks the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatCompletionResponse {
    /// `choices[0].message.content`
    pub fn into_text(self, model: &str) -> Result<String, Error> {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            Error::Llm(LlmError::InvalidResponse {
                model: model.to_string(),
                details: "no choices returned".to_string(),
            })
        })?;

        choice.message.content.ok_or_else(|| {
            Error::Llm(LlmError::InvalidResponse {
                model: model.to_string(),
                details: format!(
                    "first choice has no content (finish reason: {})",
                    choice.finish_reason.as_deref().unwrap_or("unknown")
                ),
            })
        })
    }
}

#[async_trait::async_trait]
impl LLMProvider for OpenAiClient {
    async fn query(&self, prompt: &str) -> Result<String, Error> {
        self.query(prompt).await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Model Name", self.model.clone()),
            ("Temperature", display_or_default(self.temperature)),
            ("Max Output Tokens", display_or_default(self.max_tokens)),
        ]
    }
}
