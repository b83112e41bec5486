// ABOUTME: Integration tests for environment-driven configuration
// ABOUTME: Provider ordering, remote store validation, numeric parsing and secret-free summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use pritness::config::{
    AppConfig, Environment, LlmProviderType, LogLevel, RateLimitRetryConfig, WriteQueueConfig,
};
use pritness::errors::ErrorCode;
use serial_test::serial;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_without_any_variables() {
    let config = AppConfig::from_lookup(lookup(&[])).unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(!config.llm.is_configured());
    assert!(config.remote.is_none());
    assert_eq!(config.rate_limit_retry, RateLimitRetryConfig::default());
    assert_eq!(config.write_queue, WriteQueueConfig::default());
    assert_eq!(config.ledger.water_target_ml, 2000);
    assert!(config.data_dir.ends_with("pritness"));
}

#[test]
fn test_default_provider_order_skips_missing_keys() {
    let config = AppConfig::from_lookup(lookup(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("GROQ_API_KEY", "gsk-test"),
    ]))
    .unwrap();

    let kinds: Vec<LlmProviderType> = config.llm.providers.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![LlmProviderType::Groq, LlmProviderType::OpenAi]);

    let groq = &config.llm.providers[0];
    assert_eq!(groq.text_model, "llama-3.1-8b-instant");
    assert_eq!(groq.vision_model, "meta-llama/llama-4-scout-17b-16e-instruct");
    assert!(groq.base_url.is_none());
}

#[test]
fn test_explicit_provider_order_and_overrides() {
    let config = AppConfig::from_lookup(lookup(&[
        ("PRITNESS_LLM_PROVIDERS", "gemini, groq, unknown, gemini"),
        ("GEMINI_API_KEY", "g-key"),
        ("GEMINI_MODEL", "gemini-1.5-pro"),
        ("GEMINI_BASE_URL", "http://localhost:9999"),
        ("GROQ_API_KEY", "gsk"),
        ("OPENAI_API_KEY", "unused"),
    ]))
    .unwrap();

    let kinds: Vec<LlmProviderType> = config.llm.providers.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![LlmProviderType::Gemini, LlmProviderType::Groq]);

    let gemini = &config.llm.providers[0];
    assert_eq!(gemini.text_model, "gemini-1.5-pro");
    assert_eq!(gemini.vision_model, "gemini-1.5-pro");
    assert_eq!(gemini.base_url.as_deref(), Some("http://localhost:9999"));
}

#[test]
fn test_blank_values_count_as_unset() {
    let config = AppConfig::from_lookup(lookup(&[
        ("GROQ_API_KEY", "   "),
        ("PRITNESS_REMOTE_URL", ""),
    ]))
    .unwrap();
    assert!(config.llm.providers.is_empty());
    assert!(config.remote.is_none());
}

#[test]
fn test_remote_store_requires_api_key() {
    let err = AppConfig::from_lookup(lookup(&[(
        "PRITNESS_REMOTE_URL",
        "https://demo.supabase.co",
    )]))
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);

    let config = AppConfig::from_lookup(lookup(&[
        ("PRITNESS_REMOTE_URL", "https://demo.supabase.co/"),
        ("PRITNESS_REMOTE_API_KEY", "anon"),
        ("PRITNESS_REMOTE_ACCESS_TOKEN", "jwt"),
    ]))
    .unwrap();
    let remote = config.remote.unwrap();
    assert_eq!(remote.url, "https://demo.supabase.co");
    assert_eq!(remote.api_key, "anon");
    assert_eq!(remote.access_token.as_deref(), Some("jwt"));
}

#[test]
fn test_numeric_settings_are_parsed_or_rejected() {
    let config = AppConfig::from_lookup(lookup(&[
        ("PRITNESS_LLM_MAX_RETRIES", "4"),
        ("PRITNESS_LLM_RETRY_BASE_MS", "10"),
        ("PRITNESS_WRITE_MAX_ATTEMPTS", "0"),
        ("PRITNESS_WATER_TARGET_ML", " 2500 "),
    ]))
    .unwrap();
    assert_eq!(config.rate_limit_retry.max_retries, 4);
    assert_eq!(config.rate_limit_retry.base_delay, Duration::from_millis(10));
    assert_eq!(config.write_queue.max_attempts, 1);
    assert_eq!(config.ledger.water_target_ml, 2500);

    let err = AppConfig::from_lookup(lookup(&[("PRITNESS_LLM_MAX_RETRIES", "many")])).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);
    assert!(err.message.contains("PRITNESS_LLM_MAX_RETRIES"));
}

#[test]
fn test_retry_delays_escalate() {
    let retry = RateLimitRetryConfig {
        max_retries: 2,
        base_delay: Duration::from_millis(4000),
    };
    assert_eq!(retry.delay_for(0), Duration::from_millis(4000));
    assert_eq!(retry.delay_for(1), Duration::from_millis(8000));

    let queue = WriteQueueConfig::default();
    assert_eq!(queue.backoff(1), Duration::from_millis(2000));
    assert_eq!(queue.backoff(3), Duration::from_millis(8000));
    assert_eq!(queue.backoff(30), queue.max_delay);
}

#[test]
fn test_summary_omits_secrets() {
    let config = AppConfig::from_lookup(lookup(&[
        ("GROQ_API_KEY", "gsk-very-secret"),
        ("PRITNESS_REMOTE_URL", "https://demo.supabase.co"),
        ("PRITNESS_REMOTE_API_KEY", "anon-secret"),
        ("ENVIRONMENT", "production"),
    ]))
    .unwrap();
    let summary = config.summary();
    assert!(summary.contains("providers=[groq]"));
    assert!(summary.contains("remote=enabled"));
    assert!(summary.contains("environment=production"));
    assert!(!summary.contains("secret"));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    let dir = env::temp_dir().join("pritness-config-test");
    env::set_var("PRITNESS_DATA_DIR", &dir);
    env::set_var("PRITNESS_WATER_TARGET_ML", "1800");
    env::set_var("RUST_LOG", "debug");

    let config = AppConfig::from_env().unwrap();

    env::remove_var("PRITNESS_DATA_DIR");
    env::remove_var("PRITNESS_WATER_TARGET_ML");
    env::remove_var("RUST_LOG");

    assert_eq!(config.data_dir, PathBuf::from(&dir));
    assert_eq!(config.ledger.water_target_ml, 1800);
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
#[serial]
fn test_from_env_rejects_bad_numbers() {
    env::set_var("PRITNESS_WRITE_MAX_ATTEMPTS", "-3");
    let result = AppConfig::from_env();
    env::remove_var("PRITNESS_WRITE_MAX_ATTEMPTS");

    assert_eq!(result.unwrap_err().code, ErrorCode::ConfigError);
}
