// ABOUTME: OpenAI-compatible chat completions provider used for Groq and OpenAI
// ABOUTME: Handles inline image parts, JSON mode and HTTP error classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # `OpenAI`-Compatible Provider
//!
//! Groq and `OpenAI` expose the same `chat/completions` API, so one
//! implementation serves both. The presets differ only in base URL, models
//! and the identifier reported in logs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};
use crate::config::{LlmProviderType, ProviderSettings};
use crate::errors::{AppError, AppResult};

/// Groq API base URL
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// `OpenAI` API base URL
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection timeout for cloud endpoints
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Request timeout; vision calls on large photos are slow
const REQUEST_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: OpenAiContent,
}

/// Plain string for text messages, part list when an image is attached
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        let content = match &msg.image {
            Some(image) => OpenAiContent::Parts(vec![
                OpenAiContentPart::Text {
                    text: msg.content.clone(),
                },
                OpenAiContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
            None => OpenAiContent::Text(msg.content.clone()),
        };
        Self {
            role: msg.role.as_str(),
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for an `OpenAI`-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Which backend this talks to
    pub kind: LlmProviderType,
    /// Base URL for the API, without the endpoint path
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Model for text requests
    pub default_model: String,
    /// Model for requests carrying an image
    pub vision_model: String,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Groq preset
    #[must_use]
    pub fn groq(settings: &ProviderSettings) -> Self {
        Self::from_settings(settings, GROQ_BASE_URL)
    }

    /// `OpenAI` preset
    #[must_use]
    pub fn openai(settings: &ProviderSettings) -> Self {
        Self::from_settings(settings, OPENAI_BASE_URL)
    }

    fn from_settings(settings: &ProviderSettings, default_base_url: &str) -> Self {
        Self {
            kind: settings.kind,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url.to_owned()),
            api_key: settings.api_key.clone(),
            default_model: settings.text_model.clone(),
            vision_model: settings.vision_model.clone(),
            capabilities: LlmCapabilities::full_featured(),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Chat completions client for Groq and `OpenAI`
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    fn model_for<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        request.model.as_deref().unwrap_or_else(|| {
            if request.has_image() {
                self.config.vision_model.as_str()
            } else {
                self.config.default_model.as_str()
            }
        })
    }

    /// Classify a non-2xx response
    fn parse_error_response(&self, status: StatusCode, body: &str) -> AppError {
        let provider = self.name();
        let message = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |r| r.error.message,
        );

        if status == StatusCode::TOO_MANY_REQUESTS {
            AppError::rate_limited(provider, message)
        } else {
            AppError::estimation_failed(provider, format!("API error ({status}): {message}"))
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.config.kind.as_str()
    }

    fn display_name(&self) -> &'static str {
        match self.config.kind {
            LlmProviderType::Groq => "Groq",
            LlmProviderType::OpenAi => "OpenAI",
            LlmProviderType::Gemini => "Gemini (OpenAI-compatible)",
        }
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn vision_model(&self) -> &str {
        &self.config.vision_model
    }

    #[instrument(skip(self, request), fields(provider = %self.name(), model = %self.model_for(request)))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let provider = self.name();
        let messages: Vec<OpenAiMessage> = request.messages.iter().map(Into::into).collect();
        debug!(
            messages = messages.len(),
            has_image = request.has_image(),
            "Sending chat completion request"
        );

        let body = OpenAiRequest {
            model: self.model_for(request).to_owned(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&body);

        let response = self.add_auth_header(http_request).send().await.map_err(|e| {
            error!(provider, "Failed to send request: {e}");
            AppError::estimation_failed(provider, format!("Failed to connect: {e}"))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::estimation_failed(provider, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(self.parse_error_response(status, &text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(provider, "Failed to parse API response: {e}");
            AppError::estimation_failed(provider, format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::estimation_failed(provider, "API returned no choices"))?;

        let content = choice.message.content.unwrap_or_default();
        debug!(
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(ChatResponse {
            content,
            model: parsed.model,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImageAttachment;

    #[test]
    fn test_image_message_serializes_as_parts() {
        let msg = ChatMessage::user_with_image(
            "classify",
            ImageAttachment::from_bytes(b"abc", "image/jpeg"),
        );
        let value = serde_json::to_value(OpenAiMessage::from(&msg)).unwrap();

        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][1]["type"], "image_url");
        assert_eq!(
            value["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,YWJj"
        );
    }

    #[test]
    fn test_text_message_serializes_as_string() {
        let value = serde_json::to_value(OpenAiMessage::from(&ChatMessage::system("hi"))).unwrap();
        assert_eq!(value["content"], "hi");
    }
}
