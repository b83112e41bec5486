// ABOUTME: Unified error handling with error codes and structured context
// ABOUTME: AppError, ErrorCode and the AppResult alias used across the workspace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Unified Error Handling System
//!
//! Every fallible operation in the tracker returns [`AppResult`]. Errors carry a
//! stable [`ErrorCode`] so callers can route them (field-level form messages,
//! retry affordances, registration redirects) without string matching.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Generic invalid input (e.g. a non-positive water amount)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Weight, height or age outside the accepted range
    #[serde(rename = "INVALID_BIOMETRIC_INPUT")]
    InvalidBiometricInput = 3001,

    // Resource Management (4000-4999)
    /// Requested resource does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// No durable profile exists for the authenticated identity
    #[serde(rename = "PROFILE_NOT_FOUND")]
    ProfileNotFound = 4001,

    // External Services (5000-5999)
    /// Estimation provider returned an error or an unparseable answer
    #[serde(rename = "ESTIMATION_FAILED")]
    EstimationFailed = 5000,
    /// Estimation provider rejected the call with HTTP 429
    #[serde(rename = "RATE_LIMITED")]
    RateLimited = 5001,
    /// No estimation provider is configured
    #[serde(rename = "ESTIMATOR_NOT_CONFIGURED")]
    EstimatorNotConfigured = 5002,
    /// Remote store write failed
    #[serde(rename = "REMOTE_WRITE_FAILED")]
    RemoteWriteFailed = 5010,
    /// Remote store read failed
    #[serde(rename = "REMOTE_READ_FAILED")]
    RemoteReadFailed = 5011,

    // Configuration (6000-6999)
    /// Configuration value could not be parsed
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration is absent
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Local cache read or write failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// JSON encoding or decoding failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidBiometricInput => "Biometric value is outside the accepted range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ProfileNotFound => "No profile exists for this account",
            Self::EstimationFailed => "Nutrition estimation failed",
            Self::RateLimited => "Estimation provider rate limit exceeded",
            Self::EstimatorNotConfigured => "No estimation provider is configured",
            Self::RemoteWriteFailed => "Remote store write failed",
            Self::RemoteReadFailed => "Remote store read failed",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// True for estimation failures, including the rate-limited subtype
    #[must_use]
    pub const fn is_estimation_failure(self) -> bool {
        matches!(self, Self::EstimationFailed | Self::RateLimited)
    }

    /// True when retrying the same call later may succeed
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::RemoteWriteFailed | Self::RemoteReadFailed
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional key-value context
    pub details: Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Object(Map::new()),
            source: None,
        }
    }

    /// Replace the details object
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Offending input field, when the error is a field-level validation failure
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.details.get("field").and_then(Value::as_str)
    }

    /// Shorthand for `self.code.is_estimation_failure()`
    #[must_use]
    pub const fn is_estimation_failure(&self) -> bool {
        self.code.is_estimation_failure()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Biometric field out of range
    pub fn invalid_biometric(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidBiometricInput, message).with_details(json!({ "field": field }))
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// No profile for the given identity
    pub fn profile_not_found(identity: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ProfileNotFound,
            format!("no profile for identity {identity}"),
        )
        .with_details(json!({ "identity": identity.to_string() }))
    }

    /// Provider returned an error or malformed answer
    pub fn estimation_failed(provider: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::EstimationFailed,
            format!("{provider}: {}", message.into()),
        )
        .with_details(json!({ "provider": provider }))
    }

    /// Provider answered HTTP 429
    pub fn rate_limited(provider: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, format!("{provider}: {}", message.into()))
            .with_details(json!({ "provider": provider }))
    }

    /// No estimation provider available
    pub fn estimator_not_configured() -> Self {
        Self::new(
            ErrorCode::EstimatorNotConfigured,
            "configure at least one AI provider API key",
        )
    }

    /// Remote write failure
    pub fn remote_write_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RemoteWriteFailed, message)
    }

    /// Remote read failure
    pub fn remote_read_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RemoteReadFailed, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Local storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_estimation_failure() {
        assert!(ErrorCode::RateLimited.is_estimation_failure());
        assert!(ErrorCode::EstimationFailed.is_estimation_failure());
        assert!(!ErrorCode::RemoteWriteFailed.is_estimation_failure());
    }

    #[test]
    fn test_invalid_biometric_records_field() {
        let error = AppError::invalid_biometric("age", "age must be between 10 and 120");
        assert_eq!(error.code, ErrorCode::InvalidBiometricInput);
        assert_eq!(error.field(), Some("age"));
        assert!(error.to_string().contains("age must be between"));
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::ProfileNotFound).unwrap();
        assert_eq!(json, "\"PROFILE_NOT_FOUND\"");
    }
}
