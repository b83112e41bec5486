// ABOUTME: Builds the inputs that parameterize AI meal suggestions
// ABOUTME: Remaining allowance, meal-time bucket, disliked foods and a bounded chat summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use pritness_core::constants::tracking::{CHAT_SUMMARY_MAX_CHARS, CHAT_SUMMARY_TURNS};
use pritness_core::intelligence::Goal;
use pritness_core::models::{ChatTurn, DailyTotals, MealTimeBucket, Profile};
use serde::{Deserialize, Serialize};

/// Everything the estimation gateway needs to suggest the next meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecommendationContext {
    /// `max(0, target - eaten + burned)`
    pub remaining_calories: u32,
    /// Protein grams still to eat
    pub remaining_protein_g: u32,
    /// Time-of-day bucket
    pub meal_time: MealTimeBucket,
    /// Local hour the context was built for
    pub hour: u32,
    /// Profile goal
    pub goal: Goal,
    /// Profile country, if any
    pub country: Option<String>,
    /// Labels the user asked not to see
    pub disliked_foods: Vec<String>,
    /// Flattened recent conversation
    pub chat_summary: String,
}

/// Derive suggestion inputs from profile, ledger totals and recent conversation
#[must_use]
pub fn build_recommendation_context(
    profile: &Profile,
    totals: &DailyTotals,
    hour: u32,
    recent_chat: &[ChatTurn],
    disliked_foods: &[String],
) -> RecommendationContext {
    let targets = profile.targets();
    RecommendationContext {
        remaining_calories: totals.remaining_calories(targets),
        remaining_protein_g: totals.remaining_protein(targets),
        meal_time: MealTimeBucket::from_hour(hour),
        hour,
        goal: profile.goal(),
        country: profile.country().map(str::to_owned),
        disliked_foods: disliked_foods.to_vec(),
        chat_summary: summarize_chat(recent_chat),
    }
}

/// Last turns rendered as `Role: text` lines, capped in characters
#[must_use]
pub fn summarize_chat(turns: &[ChatTurn]) -> String {
    let start = turns.len().saturating_sub(CHAT_SUMMARY_TURNS);
    let joined = turns[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");
    joined.chars().take(CHAT_SUMMARY_MAX_CHARS).collect()
}
