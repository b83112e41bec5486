// ABOUTME: Recommendation input builder, fallback menu and preference tracking
// ABOUTME: Pure derivations over profile targets and daily ledger totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

#![deny(unsafe_code)]

//! # Pritness Intelligence
//!
//! Side-effect free helpers that read ledger and goal state:
//!
//! - **recommendation**: inputs for AI meal suggestions
//! - **`fallback_menu`**: static suggestions when the AI path yields nothing
//! - **preferences**: FIFO-capped liked/disliked food labels
//! - **weight**: weight series, BMI and trend

/// Static suggestion menu
pub mod fallback_menu;

/// Liked and disliked foods
pub mod preferences;

/// Suggestion input derivation
pub mod recommendation;

/// Weight history and BMI
pub mod weight;

pub use fallback_menu::fallback_suggestions;
pub use pritness_core::models::MealTimeBucket;
pub use preferences::{Feedback, FoodPreferences};
pub use recommendation::{build_recommendation_context, summarize_chat, RecommendationContext};
pub use weight::{body_mass_index, BmiCategory, WeightHistory};
