// ABOUTME: LLM provider abstraction used by the nutrition estimation gateway
// ABOUTME: Capability flags, chat messages with inline images, and the provider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # LLM Provider Interface
//!
//! Every inference backend (Groq, Gemini, `OpenAI`) implements [`LlmProvider`].
//! The estimation gateway only talks to this trait, so providers can be
//! reordered, removed or mocked in tests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pritness::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("Reply with JSON only."),
//!         ChatMessage::user("2 scrambled eggs and toast"),
//!     ])
//!     .with_json_mode();
//!     let _response = provider.complete(&request).await;
//! }
//! ```

mod gemini;
mod openai_compatible;
mod retry;

pub use gemini::GeminiProvider;
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use retry::RateLimitRetry;

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{LlmConfig, LlmProviderType, ProviderSettings};
use crate::errors::AppResult;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// Provider capability flags
    ///
    /// The gateway uses these to route image requests to vision-capable
    /// providers only.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Provider accepts inline images
        const VISION = 0b0000_0001;
        /// Provider can be forced to answer with a JSON object
        const JSON_MODE = 0b0000_0010;
        /// Provider supports system messages
        const SYSTEM_MESSAGES = 0b0000_0100;
    }
}

impl LlmCapabilities {
    /// Text-only provider
    #[must_use]
    pub const fn text_only() -> Self {
        Self::SYSTEM_MESSAGES.union(Self::JSON_MODE)
    }

    /// Provider with text, vision and JSON mode
    #[must_use]
    pub const fn full_featured() -> Self {
        Self::VISION
            .union(Self::JSON_MODE)
            .union(Self::SYSTEM_MESSAGES)
    }

    /// Check if vision is supported
    #[must_use]
    pub const fn supports_vision(&self) -> bool {
        self.contains(Self::VISION)
    }

    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Image attached to a user message, already base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type (`image/jpeg`, `image/png`)
    pub mime_type: String,
    /// Standard base64 payload without a data URL prefix
    pub data: String,
}

impl ImageAttachment {
    /// Encode raw image bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// `data:` URL form used by OpenAI-compatible APIs
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Text content of the message
    pub content: String,
    /// Optional inline image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            image: None,
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Create a user message carrying an image
    #[must_use]
    pub fn user_with_image(content: impl Into<String>, image: ImageAttachment) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            image: Some(image),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier; the provider picks its text or vision model when unset
    pub model: Option<String>,
    /// Temperature for response randomness (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Ask the provider for a JSON object answer
    pub json_mode: bool,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            json_mode: false,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request a JSON object response
    #[must_use]
    pub const fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// True when any message carries an image
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.messages.iter().any(|m| m.image.is_some())
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "groq", "gemini")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> LlmCapabilities;

    /// Model used for text-only requests
    fn default_model(&self) -> &str;

    /// Model used when a request carries an image
    fn vision_model(&self) -> &str {
        self.default_model()
    }

    /// Perform a chat completion
    ///
    /// HTTP 429 maps to `RateLimited`; any other failure to `EstimationFailed`.
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse>;
}

/// Shared provider handle
pub type SharedProvider = Arc<dyn LlmProvider>;

/// Build the ordered provider chain from configuration
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be constructed.
pub fn build_providers(config: &LlmConfig) -> AppResult<Vec<SharedProvider>> {
    let mut providers: Vec<SharedProvider> = Vec::with_capacity(config.providers.len());
    for settings in &config.providers {
        providers.push(build_provider(settings)?);
    }
    info!(
        providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "LLM provider chain ready"
    );
    Ok(providers)
}

fn build_provider(settings: &ProviderSettings) -> AppResult<SharedProvider> {
    Ok(match settings.kind {
        LlmProviderType::Groq => Arc::new(OpenAiCompatibleProvider::new(
            OpenAiCompatibleConfig::groq(settings),
        )?),
        LlmProviderType::OpenAi => Arc::new(OpenAiCompatibleProvider::new(
            OpenAiCompatibleConfig::openai(settings),
        )?),
        LlmProviderType::Gemini => Arc::new(GeminiProvider::new(settings)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_data_url() {
        let image = ImageAttachment::from_bytes(b"abc", "image/png");
        assert_eq!(image.data, "YWJj");
        assert_eq!(image.data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_request_detects_images() {
        let text = ChatRequest::new(vec![ChatMessage::user("hi")]);
        assert!(!text.has_image());

        let vision = ChatRequest::new(vec![ChatMessage::user_with_image(
            "what is this",
            ImageAttachment::from_bytes(b"x", "image/jpeg"),
        )]);
        assert!(vision.has_image());
    }

    #[test]
    fn test_capability_presets() {
        assert!(!LlmCapabilities::text_only().supports_vision());
        assert!(LlmCapabilities::full_featured().supports_vision());
        assert!(LlmCapabilities::full_featured().supports_json_mode());
    }
}
