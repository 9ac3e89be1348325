//! AWS Bedrock `InvokeModel` client
//!
//! Signs requests with SigV4 and dispatches on the configured model id to
//! the matching per-family request/response contract.

pub mod credentials;
pub mod models;
pub mod sigv4;

use super::display_or_default;
use super::http::{build_client, classify_status, error_chain};
use super::LLMProvider;
use crate::config::{require, BedrockConfig};
use crate::error::{Error, LlmError};
use chrono::Utc;
use credentials::Credentials;
use models::{ModelFamily, Overrides};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use sigv4::{SignableRequest, SigningScope};
use tracing::{debug, warn};

const SERVICE: &str = "bedrock";

#[derive(Debug, Clone)]
pub struct BedrockClient {
    model_id: String,
    family: ModelFamily,
    region: String,
    endpoint: String,
    credentials: Credentials,
    overrides: Overrides,
    http: reqwest::Client,
}

impl BedrockClient {
    /// Resolve credentials and region, then build the client
    pub fn from_config(config: &BedrockConfig) -> Result<Self, Error> {
        let model_id = require("bedrock", "modelName", &config.model_name)?;
        let profile = credentials::profile_name(config.aws_profile.as_deref());
        let region = credentials::resolve_region(config.aws_region.as_deref(), &profile)?;
        let creds = credentials::resolve_credentials(&profile)?;

        debug!("Bedrock profile '{}' in {}", profile, region);

        Self::new(
            &model_id,
            &region,
            creds,
            config.endpoint_url.as_deref(),
            Overrides {
                temperature: config.temperature,
                max_tokens: config.max_output_tokens,
            },
            config.timeout_secs,
        )
    }

    pub fn new(
        model_id: &str,
        region: &str,
        credentials: Credentials,
        endpoint_url: Option<&str>,
        overrides: Overrides,
        timeout_secs: u64,
    ) -> Result<Self, Error> {
        let family = ModelFamily::from_model_id(model_id).ok_or_else(|| {
            Error::Llm(LlmError::UnsupportedModel {
                provider: "bedrock".to_string(),
                model: model_id.to_string(),
            })
        })?;

        let endpoint = match endpoint_url {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => format!("https://bedrock-runtime.{}.amazonaws.com", region),
        };

        Ok(Self {
            model_id: model_id.to_string(),
            family,
            region: region.to_string(),
            endpoint,
            credentials,
            overrides,
            http: build_client("bedrock", timeout_secs)?,
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub async fn query(&self, prompt: &str) -> Result<String, Error> {
        let payload = self.family.request_body(prompt, self.overrides).map_err(|e| {
            Error::Llm(LlmError::RequestFailed {
                model: self.model_id.clone(),
                source: format!("Failed to serialize request: {}", e),
            })
        })?;

        // The URL carries the encoded model id; the canonical URI encodes it again
        let encoded_model = sigv4::uri_encode(&self.model_id, true);
        let path = format!("/model/{}/invoke", encoded_model);
        let canonical_uri = format!("/model/{}/invoke", sigv4::uri_encode(&encoded_model, true));
        let url = format!("{}{}", self.endpoint, path);

        let host = host_header(&url).ok_or_else(|| {
            Error::Llm(LlmError::RequestFailed {
                model: self.model_id.clone(),
                source: format!("Invalid endpoint URL: {}", url),
            })
        })?;

        let signed = sigv4::sign(
            &SignableRequest {
                method: "POST",
                host: &host,
                canonical_uri: &canonical_uri,
                canonical_query: "",
                headers: &[("content-type", "application/json")],
                payload: &payload,
            },
            &SigningScope {
                region: &self.region,
                service: SERVICE,
                time: Utc::now(),
            },
            &self.credentials,
        )
        .map_err(|e| {
            Error::Llm(LlmError::RequestFailed {
                model: self.model_id.clone(),
                source: format!("Failed to sign request: {}", e),
            })
        })?;

        debug!(
            "POST {} [model: {}, {:?}, prompt: {} chars]",
            url,
            self.model_id,
            self.family,
            prompt.len()
        );

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("x-amz-date", signed.amz_date.as_str())
            .header(AUTHORIZATION, signed.authorization.as_str())
            .body(payload);
        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.explain_failure(&error_chain(&e), None))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response
            .bytes()
            .await
            .map_err(|e| self.explain_failure(&error_chain(&e), None))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let classified = classify_status(&self.model_id, status, retry_after, &text);
            return Err(self.explain_failure(&text, Some(classified)));
        }

        let output = self.family.extract_output(&body).map_err(|details| {
            Error::Llm(LlmError::InvalidResponse {
                model: self.model_id.clone(),
                details,
            })
        })?;

        debug!("Bedrock query completed successfully");
        Ok(output)
    }

    /// Turn a failed invocation into an error that says what to check
    fn explain_failure(&self, message: &str, classified: Option<Error>) -> Error {
        let lower = message.to_lowercase();
        if lower.contains("no such host")
            || lower.contains("dns error")
            || lower.contains("failed to lookup address")
        {
            warn!("Bedrock endpoint for {} could not be resolved", self.region);
            return Error::Llm(LlmError::ModelUnavailable(format!(
                "The Bedrock service is not available in region {}. Check service availability at \
                 https://aws.amazon.com/about-aws/global-infrastructure/regional-product-services/",
                self.region
            )));
        }
        if lower.contains("could not resolve the foundation model") {
            warn!("Bedrock could not resolve model {}", self.model_id);
            return Error::Llm(LlmError::RequestFailed {
                model: self.model_id.clone(),
                source: format!(
                    "Could not resolve the foundation model from model identifier \"{}\". \
                     Verify that the model exists and is accessible in {}",
                    self.model_id, self.region
                ),
            });
        }

        warn!("Couldn't invoke model \"{}\": {}", self.model_id, message);
        classified.unwrap_or_else(|| {
            Error::Llm(LlmError::RequestFailed {
                model: self.model_id.clone(),
                source: format!("Couldn't invoke model \"{}\": {}", self.model_id, message),
            })
        })
    }
}

/// Host header value for a URL, keeping an explicit non-default port
fn host_header(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[async_trait::async_trait]
impl LLMProvider for BedrockClient {
    async fn query(&self, prompt: &str) -> Result<String, Error> {
        self.query(prompt).await
    }

    fn name(&self) -> &str {
        "bedrock"
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Model Name", self.model_id.clone()),
            ("AWS Region", self.region.clone()),
            ("Temperature", display_or_default(self.overrides.temperature)),
            ("Max Output Tokens", display_or_default(self.overrides.max_tokens)),
        ]
    }
}
