// ABOUTME: Configuration module for environment-only settings
// ABOUTME: Re-exports typed config for providers, remote store, write queue and ledger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! Configuration is read from environment variables only; there are no config files.

/// Environment variable parsing into `AppConfig`
pub mod environment;
/// Shared config enums
pub mod types;

pub use environment::{
    AppConfig, LedgerConfig, LlmConfig, ProviderSettings, RateLimitRetryConfig,
    RemoteStoreConfig, WriteQueueConfig,
};
pub use types::{Environment, LlmProviderType, LogLevel};
