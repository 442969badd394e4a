//! Async HTTP client for structured generation
//!
//! Model-agnostic: speaks the Gemini, OpenAI-compatible and Anthropic APIs.
//! Each dialect carries the response schema its own way:
//! - Gemini: `generationConfig.responseSchema` with a JSON MIME type
//! - OpenAI-compatible: `response_format` of type `json_schema`
//! - Anthropic: a single forced tool whose input schema is the update list

use crate::core::config::LlmConfig;
use crate::core::error::{HomeError, Result};
use crate::llm::service::{GenerationRequest, GenerationService};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// API format type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApiFormat {
    Gemini,
    OpenAI,
    Anthropic,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a client from configuration; the HTTP timeout is applied to
    /// every request.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(HomeError::Config("LLM_API_KEY not set".into()));
        }
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HomeError::Llm(e.to_string()))?;

        let api_format = Self::detect_api_format(&config.api_url);
        debug!(?api_format, model = %config.model, "LLM client configured");

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_format,
        })
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("generativelanguage.googleapis.com") {
            ApiFormat::Gemini
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    fn gemini_endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    fn gemini_request(&self, request: &GenerationRequest) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(request.system.clone()),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: request.schema.gemini(),
                max_output_tokens: self.max_tokens,
            },
        }
    }

    fn openai_request(&self, request: &GenerationRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: request.system.clone(),
                },
                Message {
                    role: "user".into(),
                    content: request.prompt.clone(),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema".into(),
                json_schema: JsonSchemaFormat {
                    name: request.schema.name.into(),
                    schema: request.schema.wrapped_json_schema(),
                },
            },
        }
    }

    fn anthropic_request(&self, request: &GenerationRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: request.system.clone(),
            messages: vec![Message {
                role: "user".into(),
                content: request.prompt.clone(),
            }],
            tools: vec![Tool {
                name: request.schema.name.into(),
                description: "Report the device updates to apply.".into(),
                input_schema: request.schema.wrapped_json_schema(),
            }],
            tool_choice: ToolChoice {
                kind: "tool".into(),
                name: request.schema.name.into(),
            },
        }
    }

    async fn complete_gemini(&self, request: &GenerationRequest) -> Result<String> {
        let response = self
            .client
            .post(self.gemini_endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.gemini_request(request))
            .send()
            .await
            .map_err(|e| HomeError::Llm(e.to_string()))?;

        let completion: GeminiResponse = Self::read_json(response).await?;
        completion.text().ok_or_else(|| HomeError::Llm("Empty response".into()))
    }

    async fn complete_openai(&self, request: &GenerationRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.openai_request(request))
            .send()
            .await
            .map_err(|e| HomeError::Llm(e.to_string()))?;

        let completion: OpenAIResponse = Self::read_json(response).await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| HomeError::Llm("Empty response".into()))
    }

    async fn complete_anthropic(&self, request: &GenerationRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&self.anthropic_request(request))
            .send()
            .await
            .map_err(|e| HomeError::Llm(e.to_string()))?;

        let completion: AnthropicResponse = Self::read_json(response).await?;
        let input = completion
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { input } => Some(input),
                _ => None,
            })
            .ok_or_else(|| HomeError::Llm("Empty response".into()))?;

        Ok(serde_json::to_string(&input)?)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(HomeError::Llm(format!("API error ({}): {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| HomeError::Llm(e.to_string()))
    }
}

#[async_trait]
impl GenerationService for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        match self.api_format {
            ApiFormat::Gemini => self.complete_gemini(request).await,
            ApiFormat::OpenAI => self.complete_openai(request).await,
            ApiFormat::Anthropic => self.complete_anthropic(request).await,
        }
    }
}

// Gemini API format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, if it has any
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: Value,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    tool_choice: ToolChoice,
}

#[derive(Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: String,
    name: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse {
        input: Value,
    },
    #[serde(other)]
    Other,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
