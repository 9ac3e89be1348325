//! LLM provider abstraction and implementations
//!
//! Supports Gemini, OpenAI, Azure OpenAI and AWS Bedrock over their HTTP APIs.
//! Each provider implements the LLMProvider trait for consistent querying,
//! and provider ids map one-to-one to adapters through [`build_provider`].

pub mod azure_openai;
pub mod bedrock;
pub mod gemini;
mod http;
pub mod openai;

use crate::config::Config;
use crate::error::{Error, LlmError};
use std::fmt;
use std::str::FromStr;

/// Common trait for LLM providers
#[async_trait::async_trait]
pub trait LLMProvider: Send + Sync {
    /// Query the LLM with a prompt and return the response
    async fn query(&self, prompt: &str) -> Result<String, Error>;

    /// Get the provider name (e.g., "gemini", "openai")
    fn name(&self) -> &str;

    /// Model parameters shown in verbose mode, as (label, value) pairs
    fn params(&self) -> Vec<(&'static str, String)>;
}

/// Supported provider back ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    AzureOpenAi,
    Bedrock,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::AzureOpenAi,
        ProviderKind::Bedrock,
    ];

    /// Canonical id accepted by `-p`
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::AzureOpenAi => "azure",
            ProviderKind::Bedrock => "bedrock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "azure" | "azureopenai" | "azure-openai" | "azure_openai" => {
                Ok(ProviderKind::AzureOpenAi)
            }
            "bedrock" | "aws" | "amazon-bedrock" => Ok(ProviderKind::Bedrock),
            _ => Err(Error::Llm(LlmError::UnsupportedProvider(s.to_string()))),
        }
    }
}

/// Build the adapter for a provider from its config section.
pub fn build_provider(kind: ProviderKind, config: &Config) -> Result<Box<dyn LLMProvider>, Error> {
    let provider: Box<dyn LLMProvider> = match kind {
        ProviderKind::Gemini => Box::new(gemini::GeminiClient::from_config(config.gemini()?)?),
        ProviderKind::OpenAi => Box::new(openai::OpenAiClient::from_config(config.open_ai()?)?),
        ProviderKind::AzureOpenAi => Box::new(azure_openai::AzureOpenAiClient::from_config(
            config.azure_open_ai()?,
        )?),
        ProviderKind::Bedrock => {
            Box::new(bedrock::BedrockClient::from_config(config.bedrock()?)?)
        }
    };
    Ok(provider)
}

/// Render an optional model parameter for verbose output
pub(crate) fn display_or_default<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "(provider default)".to_string(), |v| v.to_string())
}
