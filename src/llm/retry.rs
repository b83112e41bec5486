// ABOUTME: Bounded retry with escalating delay for provider rate limiting
// ABOUTME: Only RateLimited errors are retried; everything else surfaces immediately
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use tokio::time::sleep;
use tracing::{info, warn};

use super::{ChatRequest, ChatResponse, LlmProvider};
use crate::config::RateLimitRetryConfig;
use crate::errors::{AppResult, ErrorCode};

/// Retries a completion while the provider answers HTTP 429
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRetry {
    config: RateLimitRetryConfig,
}

impl RateLimitRetry {
    /// Create a retry policy
    #[must_use]
    pub const fn new(config: RateLimitRetryConfig) -> Self {
        Self { config }
    }

    /// Retry budget in use
    #[must_use]
    pub const fn config(&self) -> &RateLimitRetryConfig {
        &self.config
    }

    /// Run `provider.complete` with up to `max_retries` extra attempts
    ///
    /// Retry `i` (0-based) waits `(i + 1) * base_delay` first.
    ///
    /// # Errors
    ///
    /// Returns the provider error once it is not `RateLimited` or the
    /// retry budget is spent.
    pub async fn complete(
        &self,
        provider: &dyn LlmProvider,
        request: &ChatRequest,
    ) -> AppResult<ChatResponse> {
        let mut retry = 0;
        loop {
            match provider.complete(request).await {
                Err(error)
                    if error.code == ErrorCode::RateLimited && retry < self.config.max_retries =>
                {
                    let delay = self.config.delay_for(retry);
                    warn!(
                        provider = provider.name(),
                        retry = retry + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Provider rate limited, backing off"
                    );
                    sleep(delay).await;
                    retry += 1;
                }
                Ok(response) => {
                    if retry > 0 {
                        info!(
                            provider = provider.name(),
                            retries = retry,
                            "Provider recovered after rate limit"
                        );
                    }
                    return Ok(response);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RateLimitRetry {
    fn default() -> Self {
        Self::new(RateLimitRetryConfig::default())
    }
}
