// ABOUTME: Environment-driven configuration for providers, remote store and ledger
// ABOUTME: Parses PRITNESS_* and provider key variables into typed config structs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pritness_core::constants::tracking::DEFAULT_WATER_TARGET_ML;
use tracing::{debug, info};

use super::types::{Environment, LlmProviderType, LogLevel};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Default Groq text model
pub const DEFAULT_GROQ_TEXT_MODEL: &str = "llama-3.1-8b-instant";
/// Default Groq vision model
pub const DEFAULT_GROQ_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
/// Default Gemini model (text and vision)
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
/// Default `OpenAI` text model
pub const DEFAULT_OPENAI_TEXT_MODEL: &str = "gpt-4o-mini";
/// Default `OpenAI` vision model
pub const DEFAULT_OPENAI_VISION_MODEL: &str = "gpt-4o";

/// Settings for one configured estimation provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Which provider
    pub kind: LlmProviderType,
    /// API key
    pub api_key: String,
    /// Base URL override (tests, proxies)
    pub base_url: Option<String>,
    /// Model for text prompts
    pub text_model: String,
    /// Model for image prompts
    pub vision_model: String,
}

/// Ordered estimation providers; only providers with a key are present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmConfig {
    /// Providers in fallback order
    pub providers: Vec<ProviderSettings>,
}

impl LlmConfig {
    /// True when at least one provider has a key
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }
}

/// Bounded retry on provider HTTP 429
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay unit; retry `i` (0-based) waits `(i + 1) * base_delay`
    pub base_delay: Duration,
}

impl Default for RateLimitRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(4000),
        }
    }
}

impl RateLimitRetryConfig {
    /// Escalating delay before retry `retry_index`
    #[must_use]
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        self.base_delay.saturating_mul(retry_index.saturating_add(1))
    }
}

/// Hosted `PostgREST` store connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Anonymous/public API key
    pub api_key: String,
    /// User access token, when signed in
    pub access_token: Option<String>,
}

/// Remote write retry queue tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteQueueConfig {
    /// Attempts per write before it is dropped
    pub max_attempts: u32,
    /// Backoff after the first failed pass
    pub base_delay: Duration,
    /// Backoff ceiling
    pub max_delay: Duration,
}

impl Default for WriteQueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl WriteQueueConfig {
    /// Exponential backoff after `failed_passes` consecutive failing passes
    #[must_use]
    pub fn backoff(&self, failed_passes: u32) -> Duration {
        let exponent = failed_passes.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1_u32 << exponent)
            .min(self.max_delay)
    }
}

/// Ledger settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Daily water goal in millilitres
    pub water_target_ml: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            water_target_ml: DEFAULT_WATER_TARGET_ML,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Estimation providers
    pub llm: LlmConfig,
    /// 429 retry policy
    pub rate_limit_retry: RateLimitRetryConfig,
    /// Remote store, `None` for offline mode
    pub remote: Option<RemoteStoreConfig>,
    /// Remote write queue tuning
    pub write_queue: WriteQueueConfig,
    /// Ledger settings
    pub ledger: LedgerConfig,
    /// Local cache directory
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a numeric variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = get("ENVIRONMENT")
            .map(|v| Environment::from_str_or_default(&v))
            .unwrap_or_default();
        let log_level = get("RUST_LOG")
            .map(|v| LogLevel::from_str_or_default(&v))
            .unwrap_or_default();

        let llm = load_llm_config(&get);

        let rate_limit_retry = RateLimitRetryConfig {
            max_retries: parse_or(&get, "PRITNESS_LLM_MAX_RETRIES", 2)?,
            base_delay: Duration::from_millis(parse_or(&get, "PRITNESS_LLM_RETRY_BASE_MS", 4000)?),
        };

        let remote = match (get("PRITNESS_REMOTE_URL"), get("PRITNESS_REMOTE_API_KEY")) {
            (Some(url), Some(api_key)) => Some(RemoteStoreConfig {
                url: url.trim_end_matches('/').to_owned(),
                api_key,
                access_token: get("PRITNESS_REMOTE_ACCESS_TOKEN"),
            }),
            (Some(_), None) => {
                return Err(AppError::new(
                    ErrorCode::ConfigMissing,
                    "PRITNESS_REMOTE_URL is set but PRITNESS_REMOTE_API_KEY is missing",
                ))
            }
            _ => None,
        };

        let write_queue = WriteQueueConfig {
            max_attempts: parse_or(&get, "PRITNESS_WRITE_MAX_ATTEMPTS", 5)?.max(1),
            base_delay: Duration::from_millis(parse_or(&get, "PRITNESS_WRITE_RETRY_BASE_MS", 2000)?),
            max_delay: WriteQueueConfig::default().max_delay,
        };

        let ledger = LedgerConfig {
            water_target_ml: parse_or(&get, "PRITNESS_WATER_TARGET_ML", DEFAULT_WATER_TARGET_ML)?,
        };

        let data_dir = get("PRITNESS_DATA_DIR").map_or_else(default_data_dir, PathBuf::from);

        let config = Self {
            environment,
            log_level,
            llm,
            rate_limit_retry,
            remote,
            write_queue,
            ledger,
            data_dir,
        };
        debug!("{}", config.summary());
        Ok(config)
    }

    /// Configuration summary without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        let providers: Vec<&str> = self.llm.providers.iter().map(|p| p.kind.as_str()).collect();
        format!(
            "Pritness configuration: environment={}, log_level={}, providers=[{}], remote={}, data_dir={}",
            self.environment,
            self.log_level,
            providers.join(","),
            if self.remote.is_some() { "enabled" } else { "offline" },
            self.data_dir.display()
        )
    }
}

fn load_llm_config<G>(get: &G) -> LlmConfig
where
    G: Fn(&str) -> Option<String>,
{
    let order: Vec<LlmProviderType> = get(LlmProviderType::ENV_VAR).map_or_else(
        || LlmProviderType::DEFAULT_ORDER.to_vec(),
        |raw| {
            let mut order = Vec::new();
            for kind in raw.split(',').filter_map(LlmProviderType::parse) {
                if !order.contains(&kind) {
                    order.push(kind);
                }
            }
            order
        },
    );

    let providers = order
        .into_iter()
        .filter_map(|kind| {
            let Some(api_key) = get(kind.api_key_env_var()) else {
                info!(provider = %kind, "Estimation provider skipped: no API key");
                return None;
            };
            let (text_model, vision_model) = match kind {
                LlmProviderType::Groq => (
                    get("GROQ_TEXT_MODEL").unwrap_or_else(|| DEFAULT_GROQ_TEXT_MODEL.to_owned()),
                    get("GROQ_VISION_MODEL")
                        .unwrap_or_else(|| DEFAULT_GROQ_VISION_MODEL.to_owned()),
                ),
                LlmProviderType::Gemini => {
                    let model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned());
                    (model.clone(), model)
                }
                LlmProviderType::OpenAi => (
                    get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_TEXT_MODEL.to_owned()),
                    get("OPENAI_VISION_MODEL")
                        .unwrap_or_else(|| DEFAULT_OPENAI_VISION_MODEL.to_owned()),
                ),
            };
            Some(ProviderSettings {
                kind,
                api_key,
                base_url: get(kind.base_url_env_var()),
                text_model,
                vision_model,
            })
        })
        .collect();

    LlmConfig { providers }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> AppResult<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    get(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|_| AppError::config(format!("Invalid {key} value: {raw}")))
    })
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("pritness")
}
