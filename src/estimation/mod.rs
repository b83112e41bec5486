// ABOUTME: Nutrition estimation gateway turning meal text, photos, workouts and biometrics into estimates
// ABOUTME: Ordered LLM provider chain with rate-limit retry, tolerant parsing and a not-configured sentinel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Nutrition Estimation Gateway
//!
//! The ledger never waits on this gateway: callers estimate first, then log
//! the accepted result. Every call is fallible and slow.
//!
//! [`LlmEstimationGateway`] walks its providers in order. Each provider gets
//! the rate-limit retry budget; a provider that fails (or answers with
//! something unparseable) hands over to the next one. Photo calls skip
//! providers without [`LlmCapabilities::VISION`](crate::llm::LlmCapabilities).

mod generation;
pub mod parsing;
pub mod prompts;

pub use generation::{EstimationSlot, GenerationTicket, RequestGenerations};

use std::time::Instant;

use async_trait::async_trait;
use pritness_core::constants::tracking::{DEFAULT_WORKOUT_WEIGHT_KG, SUGGESTIONS_PER_REQUEST};
use pritness_core::intelligence::{compute_bmr, BiometricInput, Goal, NutritionTargets};
use pritness_core::models::{
    ChatTurn, EstimateOrigin, ImageEstimate, MealSuggestion, NutritionEstimate, TurnRole,
    WorkoutEstimate,
};
use pritness_intelligence::RecommendationContext;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{
    build_providers, ChatMessage, ChatRequest, ImageAttachment, LlmProvider, RateLimitRetry,
    SharedProvider,
};
use crate::logging::AppLogger;

/// Deterministic estimates want the coldest sampling
const ESTIMATE_TEMPERATURE: f32 = 0.0;
const CREATIVE_TEMPERATURE: f32 = 0.7;
const ESTIMATE_MAX_TOKENS: u32 = 1024;
const WORKOUT_MAX_TOKENS: u32 = 512;
const TARGETS_MAX_TOKENS: u32 = 512;
const SUGGESTION_MAX_TOKENS: u32 = 2048;

/// Everything the tracker asks of an estimator
#[async_trait]
pub trait NutritionEstimationGateway: Send + Sync {
    /// True when at least one provider is available
    fn is_configured(&self) -> bool;

    /// Estimate a meal from a free-text description
    ///
    /// Unconfigured gateways answer with [`NutritionEstimate::unconfigured`].
    async fn estimate_from_text(&self, description: &str) -> AppResult<NutritionEstimate>;

    /// Classify a photo as food or workout and estimate it
    async fn estimate_from_image(&self, image: &ImageAttachment) -> AppResult<ImageEstimate>;

    /// Estimate calories burned by a described workout
    async fn estimate_workout_from_text(
        &self,
        description: &str,
        weight_kg: Option<f64>,
    ) -> AppResult<WorkoutEstimate>;

    /// Independent estimate of the daily targets for `input` under `goal`
    ///
    /// Used to cross-check the goal engine, never to replace it.
    async fn recommend_targets(
        &self,
        input: &BiometricInput,
        goal: Goal,
    ) -> AppResult<NutritionTargets>;

    /// Up to three meal suggestions fitting the remaining allowance
    async fn suggest_meals(
        &self,
        context: &RecommendationContext,
    ) -> AppResult<Vec<MealSuggestion>>;

    /// Assistant reply to `message` given prior turns
    async fn chat(&self, history: &[ChatTurn], message: &str) -> AppResult<String>;
}

/// Gateway backed by an ordered list of LLM providers
pub struct LlmEstimationGateway {
    providers: Vec<SharedProvider>,
    retry: RateLimitRetry,
}

impl LlmEstimationGateway {
    /// Gateway over `providers`, tried in order
    #[must_use]
    pub const fn new(providers: Vec<SharedProvider>, retry: RateLimitRetry) -> Self {
        Self { providers, retry }
    }

    /// Build the provider chain from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configured provider cannot be constructed.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let providers = build_providers(&config.llm)?;
        Ok(Self::new(
            providers,
            RateLimitRetry::new(config.rate_limit_retry),
        ))
    }

    /// Providers in fallback order
    #[must_use]
    pub fn providers(&self) -> &[SharedProvider] {
        &self.providers
    }

    /// Run `build` against each eligible provider until `parse` accepts an answer
    async fn run<T, B, P>(
        &self,
        operation: &'static str,
        needs_vision: bool,
        build: B,
        parse: P,
    ) -> AppResult<T>
    where
        T: Send,
        B: Fn(&dyn LlmProvider) -> ChatRequest + Send + Sync,
        P: Fn(&str, &str) -> AppResult<T> + Send + Sync,
    {
        if self.providers.is_empty() {
            return Err(AppError::estimator_not_configured());
        }

        let mut last_error = None;
        for provider in &self.providers {
            if needs_vision && !provider.capabilities().supports_vision() {
                debug!(provider = provider.name(), operation, "Skipping provider without vision");
                continue;
            }

            let started = Instant::now();
            let request = build(provider.as_ref());
            let result = match self.retry.complete(provider.as_ref(), &request).await {
                Ok(response) => parse(provider.name(), &response.content),
                Err(error) => Err(error),
            };
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            AppLogger::log_estimation(provider.name(), operation, result.is_ok(), elapsed_ms);

            match result {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!(
                        provider = provider.name(),
                        operation,
                        error = %error,
                        "Estimation provider failed, trying next"
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::new(
                ErrorCode::EstimatorNotConfigured,
                "No configured provider can analyse images",
            )
        }))
    }

    fn json_request(provider: &dyn LlmProvider, request: ChatRequest) -> ChatRequest {
        if provider.capabilities().supports_json_mode() {
            request.with_json_mode()
        } else {
            request
        }
    }
}

#[async_trait]
impl NutritionEstimationGateway for LlmEstimationGateway {
    fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    async fn estimate_from_text(&self, description: &str) -> AppResult<NutritionEstimate> {
        if !self.is_configured() {
            return Ok(NutritionEstimate::unconfigured());
        }
        if description.trim().is_empty() {
            return Err(AppError::invalid_input("meal description is empty"));
        }
        self.run(
            "estimate_from_text",
            false,
            |provider| {
                Self::json_request(
                    provider,
                    ChatRequest::new(vec![
                        ChatMessage::system(prompts::MEAL_TEXT_PROMPT),
                        ChatMessage::user(prompts::meal_text_message(description)),
                    ])
                    .with_temperature(ESTIMATE_TEMPERATURE)
                    .with_max_tokens(ESTIMATE_MAX_TOKENS),
                )
            },
            parsing::parse_nutrition,
        )
        .await
    }

    async fn estimate_from_image(&self, image: &ImageAttachment) -> AppResult<ImageEstimate> {
        self.run(
            "estimate_from_image",
            true,
            |provider| {
                Self::json_request(
                    provider,
                    ChatRequest::new(vec![ChatMessage::user_with_image(
                        prompts::IMAGE_PROMPT,
                        image.clone(),
                    )])
                    .with_temperature(ESTIMATE_TEMPERATURE)
                    .with_max_tokens(ESTIMATE_MAX_TOKENS),
                )
            },
            parsing::parse_image,
        )
        .await
    }

    async fn estimate_workout_from_text(
        &self,
        description: &str,
        weight_kg: Option<f64>,
    ) -> AppResult<WorkoutEstimate> {
        if !self.is_configured() {
            return Ok(WorkoutEstimate {
                description: "AI estimation is not configured; add a provider API key".to_owned(),
                exercises: Vec::new(),
                estimated_calories_burned: 0,
                origin: EstimateOrigin::Unconfigured,
            });
        }
        let weight = weight_kg
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(DEFAULT_WORKOUT_WEIGHT_KG);
        let prompt = prompts::workout_prompt(description, weight);
        self.run(
            "estimate_workout",
            false,
            |provider| {
                Self::json_request(
                    provider,
                    ChatRequest::new(vec![ChatMessage::user(prompt.as_str())])
                        .with_temperature(ESTIMATE_TEMPERATURE)
                        .with_max_tokens(WORKOUT_MAX_TOKENS),
                )
            },
            parsing::parse_workout,
        )
        .await
    }

    async fn recommend_targets(
        &self,
        input: &BiometricInput,
        goal: Goal,
    ) -> AppResult<NutritionTargets> {
        input.validate()?;
        let message = prompts::targets_message(input, goal);
        let bmr = compute_bmr(input);
        self.run(
            "recommend_targets",
            false,
            |provider| {
                Self::json_request(
                    provider,
                    ChatRequest::new(vec![
                        ChatMessage::system(prompts::TARGETS_PROMPT),
                        ChatMessage::user(message.as_str()),
                    ])
                    .with_temperature(ESTIMATE_TEMPERATURE)
                    .with_max_tokens(TARGETS_MAX_TOKENS),
                )
            },
            |provider, text| parsing::parse_targets(provider, text, bmr),
        )
        .await
    }

    async fn suggest_meals(
        &self,
        context: &RecommendationContext,
    ) -> AppResult<Vec<MealSuggestion>> {
        let prompt = prompts::suggestions_prompt(context, SUGGESTIONS_PER_REQUEST);
        // JSON mode only allows objects at the top level, the answer is an array
        self.run(
            "suggest_meals",
            false,
            |_| {
                ChatRequest::new(vec![ChatMessage::user(prompt.as_str())])
                    .with_temperature(CREATIVE_TEMPERATURE)
                    .with_max_tokens(SUGGESTION_MAX_TOKENS)
            },
            |provider, text| parsing::parse_suggestions(provider, text, SUGGESTIONS_PER_REQUEST),
        )
        .await
    }

    async fn chat(&self, history: &[ChatTurn], message: &str) -> AppResult<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(prompts::CHAT_SYSTEM_PROMPT));
        messages.extend(history.iter().map(|turn| match turn.role {
            TurnRole::User => ChatMessage::user(turn.content.as_str()),
            TurnRole::Assistant => ChatMessage::assistant(turn.content.as_str()),
        }));
        messages.push(ChatMessage::user(message));

        self.run(
            "chat",
            false,
            |_| {
                ChatRequest::new(messages.clone())
                    .with_temperature(CREATIVE_TEMPERATURE)
                    .with_max_tokens(ESTIMATE_MAX_TOKENS)
            },
            |provider, text| {
                let reply = text.trim();
                if reply.is_empty() {
                    Err(AppError::estimation_failed(provider, "empty reply"))
                } else {
                    Ok(reply.to_owned())
                }
            },
        )
        .await
    }
}
