//! Azure OpenAI chat-completions client
//!
//! Same wire format as OpenAI, addressed by deployment instead of model
//! and authenticated with an `api-key` header.

use super::http::{build_client, send_json};
use super::openai::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::{display_or_default, LLMProvider};
use crate::config::{require, AzureOpenAiConfig};
use crate::error::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    api_key: String,
    deployment_id: String,
    endpoint: String,
    api_version: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    http: reqwest::Client,
}

impl AzureOpenAiClient {
    pub fn from_config(config: &AzureOpenAiConfig) -> Result<Self, Error> {
        let endpoint = require("azureOpenAI", "modelEndpoint", &config.model_endpoint)?;
        Ok(Self {
            api_key: config.resolved_api_key()?,
            deployment_id: require(
                "azureOpenAI",
                "modelDeploymentID",
                &config.model_deployment_id,
            )?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
            http: build_client("azure-openai", config.timeout_secs)?,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment_id
        )
    }

    pub async fn query(&self, prompt: &str) -> Result<String, Error> {
        let body = ChatCompletionRequest {
            model: None,
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "POST {} [deployment: {}, prompt: {} chars]",
            self.url(),
            self.deployment_id,
            prompt.len()
        );

        let request = self
            .http
            .post(self.url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", self.api_key.as_str())
            .json(&body);

        let response: ChatCompletionResponse = send_json("azure-openai", request).await?;
        response.into_text("azure-openai")
    }
}

#[async_trait::async_trait]
impl LLMProvider for AzureOpenAiClient {
    async fn query(&self, prompt: &str) -> Result<String, Error> {
        self.query(prompt).await
    }

    fn name(&self) -> &str {
        "azure-openai"
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Model Deployment ID", self.deployment_id.clone()),
            ("Model Endpoint", self.endpoint.clone()),
            ("Temperature", display_or_default(self.temperature)),
            ("Max Output Tokens", display_or_default(self.max_tokens)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_and_params() {
        let config: AzureOpenAiConfig = serde_yaml::from_str(
            "apiKey: k\nmodelDeploymentID: chat\nmodelEndpoint: https://res.openai.azure.com/\nmaxOutputTokens: 50\n",
        )
        .unwrap();
        let client = AzureOpenAiClient::from_config(&config).unwrap();
        assert_eq!(
            client.url(),
            "https://res.openai.azure.com/openai/deployments/chat/chat/completions"
        );
        let params = client.params();
        assert_eq!(params[0], ("Model Deployment ID", "chat".to_string()));
        assert_eq!(params[3], ("Max Output Tokens", "50".to_string()));
    }

    #[test]
    fn test_missing_endpoint() {
        let config: AzureOpenAiConfig =
            serde_yaml::from_str("apiKey: k\nmodelDeploymentID: chat\n").unwrap();
        let err = AzureOpenAiClient::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("azureOpenAI.modelEndpoint"));
    }
}
