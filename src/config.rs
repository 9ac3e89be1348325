//! YAML configuration loaded from `$HOME/.config/gq/.gq.yaml`
//!
//! Each provider has its own optional section. Sections are only checked
//! when the provider is actually selected, so a config with just a
//! `gemini` block is valid as long as nobody asks for OpenAI.

use crate::error::ConfigError;
use crate::llm::ProviderKind;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = ".config/gq";
const CONFIG_FILE: &str = ".gq.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Provider used when `-p` is not given
    #[serde(default, alias = "defaultprovider")]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    #[serde(default, rename = "openAI", alias = "openai")]
    pub open_ai: Option<OpenAiConfig>,
    #[serde(default, rename = "azureOpenAI", alias = "azureopenai")]
    pub azure_open_ai: Option<AzureOpenAiConfig>,
    #[serde(default)]
    pub bedrock: Option<BedrockConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    #[serde(default, alias = "apikey")]
    pub api_key: String,
    #[serde(default = "default_gemini_model", alias = "modelname")]
    pub model_name: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default, alias = "maxoutputtokens")]
    pub max_output_tokens: Option<u32>,
    #[serde(default = "default_gemini_base_url", alias = "baseurl")]
    pub base_url: String,
    #[serde(default = "default_timeout", alias = "timeoutsecs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    #[serde(default, alias = "apikey")]
    pub api_key: String,
    #[serde(default, alias = "modelname")]
    pub model_name: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default, alias = "maxoutputtokens")]
    pub max_output_tokens: Option<u32>,
    #[serde(default = "default_openai_base_url", alias = "baseurl")]
    pub base_url: String,
    #[serde(default = "default_timeout", alias = "timeoutsecs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureOpenAiConfig {
    #[serde(default, alias = "apikey")]
    pub api_key: String,
    #[serde(default, rename = "modelDeploymentID", alias = "modeldeploymentid")]
    pub model_deployment_id: String,
    #[serde(default, alias = "modelendpoint")]
    pub model_endpoint: String,
    #[serde(default = "default_azure_api_version", alias = "apiversion")]
    pub api_version: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default, alias = "maxoutputtokens")]
    pub max_output_tokens: Option<u32>,
    #[serde(default = "default_timeout", alias = "timeoutsecs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockConfig {
    #[serde(default, alias = "modelname")]
    pub model_name: String,
    #[serde(default, alias = "awsprofile")]
    pub aws_profile: Option<String>,
    #[serde(default, alias = "awsregion")]
    pub aws_region: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default, alias = "maxoutputtokens")]
    pub max_output_tokens: Option<u32>,
    /// Overrides `https://bedrock-runtime.{region}.amazonaws.com`
    #[serde(default, alias = "endpointurl")]
    pub endpoint_url: Option<String>,
    #[serde(default = "default_timeout", alias = "timeoutsecs")]
    pub timeout_secs: u64,
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_azure_api_version() -> String {
    "2024-02-01".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Config {
    /// `$HOME/.config/gq/.gq.yaml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::HomeDirNotFound)
    }

    /// Load config from a YAML file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml(&contents).map_err(|e| match e {
            ConfigError::ParseFailed { details, .. } => ConfigError::ParseFailed {
                path: path.display().to_string(),
                details,
            },
            other => other,
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to null rather than an empty mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseFailed {
            path: "<inline>".to_string(),
            details: e.to_string(),
        })
    }

    /// Pick the provider: explicit flag, then `defaultProvider`, then Gemini.
    pub fn resolve_provider(&self, flag: Option<&str>) -> crate::Result<ProviderKind> {
        match flag.or(self.default_provider.as_deref()) {
            Some(name) => name.parse(),
            None => Ok(ProviderKind::Gemini),
        }
    }

    pub fn gemini(&self) -> Result<&GeminiConfig, ConfigError> {
        self.gemini
            .as_ref()
            .ok_or_else(|| ConfigError::MissingSection("gemini".to_string()))
    }

    pub fn open_ai(&self) -> Result<&OpenAiConfig, ConfigError> {
        self.open_ai
            .as_ref()
            .ok_or_else(|| ConfigError::MissingSection("openAI".to_string()))
    }

    pub fn azure_open_ai(&self) -> Result<&AzureOpenAiConfig, ConfigError> {
        self.azure_open_ai
            .as_ref()
            .ok_or_else(|| ConfigError::MissingSection("azureOpenAI".to_string()))
    }

    pub fn bedrock(&self) -> Result<&BedrockConfig, ConfigError> {
        self.bedrock
            .as_ref()
            .ok_or_else(|| ConfigError::MissingSection("bedrock".to_string()))
    }
}

impl GeminiConfig {
    pub fn resolved_api_key(&self) -> Result<String, ConfigError> {
        api_key_or_env("gemini", &self.api_key, "GEMINI_API_KEY")
    }
}

impl OpenAiConfig {
    pub fn resolved_api_key(&self) -> Result<String, ConfigError> {
        api_key_or_env("openAI", &self.api_key, "OPENAI_API_KEY")
    }
}

impl AzureOpenAiConfig {
    pub fn resolved_api_key(&self) -> Result<String, ConfigError> {
        api_key_or_env("azureOpenAI", &self.api_key, "AZURE_OPENAI_API_KEY")
    }
}

/// Return `value` unless it is blank, in which case fall back to `fallback`.
pub(crate) fn non_empty_or(value: &str, fallback: Option<String>) -> Option<String> {
    let value = value.trim();
    if !value.is_empty() {
        return Some(value.to_string());
    }
    fallback
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Error unless a required string field is set.
pub(crate) fn require(section: &str, field: &str, value: &str) -> Result<String, ConfigError> {
    non_empty_or(value, None).ok_or_else(|| ConfigError::MissingField {
        section: section.to_string(),
        field: field.to_string(),
    })
}

fn api_key_or_env(section: &str, value: &str, env_var: &str) -> Result<String, ConfigError> {
    non_empty_or(value, env::var(env_var).ok()).ok_or_else(|| ConfigError::MissingField {
        section: section.to_string(),
        field: "apiKey".to_string(),
    })
}
