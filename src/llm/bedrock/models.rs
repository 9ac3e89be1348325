//! Per-model request and response bodies for Bedrock `InvokeModel`
//!
//! Every model family on Bedrock has its own JSON contract. The family is
//! picked from the model id prefix. Claude is limited to the text-completions
//! generation (`claude-v*`, `claude-instant*`); Claude 3 and later only
//! accept the Messages API.

use serde::{Deserialize, Serialize};

/// Model families gq knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Claude,
    Jurassic2,
    Llama,
    TitanImage,
    TitanText,
}

/// Temperature and token limit from the config, when set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl ModelFamily {
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        const PREFIXES: &[(&str, ModelFamily)] = &[
            ("anthropic.claude-v", ModelFamily::Claude),
            ("anthropic.claude-instant", ModelFamily::Claude),
            ("ai21.j2", ModelFamily::Jurassic2),
            ("meta.llama", ModelFamily::Llama),
            ("amazon.titan-image", ModelFamily::TitanImage),
            ("amazon.titan-text", ModelFamily::TitanText),
        ];
        PREFIXES
            .iter()
            .find(|(prefix, _)| model_id.starts_with(prefix))
            .map(|(_, family)| *family)
    }

    /// Serialize the request body for `prompt`
    pub fn request_body(&self, prompt: &str, overrides: Overrides) -> serde_json::Result<Vec<u8>> {
        match self {
            ModelFamily::Claude => serde_json::to_vec(&ClaudeRequest {
                prompt: format!("\n\nHuman: {}\n\nAssistant:", prompt),
                max_tokens_to_sample: overrides.max_tokens.unwrap_or(200),
                temperature: overrides.temperature.unwrap_or(0.5),
                stop_sequences: vec!["\n\nHuman:".to_string()],
            }),
            ModelFamily::Jurassic2 => serde_json::to_vec(&Jurassic2Request {
                prompt: prompt.to_string(),
                max_tokens: overrides.max_tokens.unwrap_or(200),
                temperature: overrides.temperature.unwrap_or(0.5),
            }),
            ModelFamily::Llama => serde_json::to_vec(&LlamaRequest {
                prompt: prompt.to_string(),
                max_gen_len: overrides.max_tokens.unwrap_or(512),
                temperature: overrides.temperature.unwrap_or(0.5),
            }),
            ModelFamily::TitanImage => serde_json::to_vec(&TitanImageRequest {
                task_type: "TEXT_IMAGE".to_string(),
                text_to_image_params: TextToImageParams {
                    text: prompt.to_string(),
                },
                image_generation_config: ImageGenerationConfig {
                    number_of_images: 1,
                    quality: "standard".to_string(),
                    cfg_scale: 8.0,
                    height: 512,
                    width: 512,
                    seed: 0,
                },
            }),
            ModelFamily::TitanText => serde_json::to_vec(&TitanTextRequest {
                input_text: prompt.to_string(),
                text_generation_config: TextGenerationConfig {
                    temperature: overrides.temperature.unwrap_or(0.0),
                    top_p: 1.0,
                    max_token_count: overrides.max_tokens.unwrap_or(4096),
                    stop_sequences: Vec::new(),
                },
            }),
        }
    }

    /// Pull the generated text (or base64 image) out of a response body
    pub fn extract_output(&self, body: &[u8]) -> Result<String, String> {
        let parse_err = |e: serde_json::Error| format!("Failed to parse JSON: {}", e);
        match self {
            ModelFamily::Claude => {
                let response: ClaudeResponse = serde_json::from_slice(body).map_err(parse_err)?;
                Ok(response.completion)
            }
            ModelFamily::Jurassic2 => {
                let response: Jurassic2Response =
                    serde_json::from_slice(body).map_err(parse_err)?;
                response
                    .completions
                    .into_iter()
                    .next()
                    .map(|c| c.data.text)
                    .ok_or_else(|| "no completions returned".to_string())
            }
            ModelFamily::Llama => {
                let response: LlamaResponse = serde_json::from_slice(body).map_err(parse_err)?;
                Ok(response.generation)
            }
            ModelFamily::TitanImage => {
                let response: TitanImageResponse =
                    serde_json::from_slice(body).map_err(parse_err)?;
                response
                    .images
                    .into_iter()
                    .next()
                    .ok_or_else(|| "no images returned".to_string())
            }
            ModelFamily::TitanText => {
                let response: TitanTextResponse =
                    serde_json::from_slice(body).map_err(parse_err)?;
                response
                    .results
                    .into_iter()
                    .next()
                    .map(|r| r.output_text)
                    .ok_or_else(|| "no results returned".to_string())
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaudeRequest {
    pub prompt: String,
    pub max_tokens_to_sample: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClaudeResponse {
    pub completion: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Jurassic2Request {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct Jurassic2Response {
    #[serde(default)]
    pub completions: Vec<Jurassic2Completion>,
}

#[derive(Debug, Deserialize)]
pub struct Jurassic2Completion {
    pub data: Jurassic2Data,
}

#[derive(Debug, Deserialize)]
pub struct Jurassic2Data {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LlamaRequest {
    pub prompt: String,
    pub max_gen_len: u32,
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct LlamaResponse {
    pub generation: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanImageRequest {
    pub task_type: String,
    pub text_to_image_params: TextToImageParams,
    pub image_generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct TextToImageParams {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationConfig {
    pub number_of_images: u32,
    pub quality: String,
    pub cfg_scale: f64,
    pub height: u32,
    pub width: u32,
    pub seed: i64,
}

#[derive(Debug, Deserialize)]
pub struct TitanImageResponse {
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextRequest {
    pub input_text: String,
    pub text_generation_config: TextGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub max_token_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextResponse {
    #[serde(default)]
    pub input_text_token_count: u32,
    #[serde(default)]
    pub results: Vec<TitanTextResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextResult {
    #[serde(default)]
    pub token_count: u32,
    pub output_text: String,
    #[serde(default)]
    pub completion_reason: Option<String>,
}
