// ABOUTME: Main library entry point for the Pritness nutrition tracker
// ABOUTME: Daily ledger, remote sync, estimation gateway and the session composition root
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

#![deny(unsafe_code)]

//! # Pritness
//!
//! Daily nutrition ledger and goal engine with an AI estimation gateway.
//!
//! ## Architecture
//!
//! - **ledger**: per-profile daily aggregate with explicit date rollover
//! - **sync**: remote store contract, `PostgREST` and in-memory adapters, write queue
//! - **llm**: provider abstraction over Groq, Gemini and `OpenAI`
//! - **estimation**: meal, photo and workout estimates on top of the providers
//! - **`local_store`**: JSON cache for the ledger day, preferences and weights
//! - **context**: constructor-injected collaborators and the per-profile session
//!
//! Targets come from [`pritness_core::intelligence`]; recommendation inputs
//! from [`pritness_intelligence`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pritness::config::AppConfig;
//! use pritness::context::TrackerContext;
//! use pritness::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let context = TrackerContext::from_config(AppConfig::from_env()?)?;
//!     let _worker = context.spawn_write_worker();
//!     let mut session = context.load_session("auth-user-id").await?;
//!     session.add_water(250).await?;
//!     println!("{} kcal left", session.summary().remaining_calories);
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Tracker context and per-profile session
pub mod context;

/// Error types (re-exported from `pritness-core`)
pub mod errors;

/// Nutrition estimation gateway
pub mod estimation;

/// Daily ledger
pub mod ledger;

/// LLM provider abstraction
pub mod llm;

/// Local JSON cache
pub mod local_store;

/// Logging configuration and domain event helpers
pub mod logging;

/// Remote sync adapters and the write queue
pub mod sync;

pub use pritness_core::{intelligence, models};
