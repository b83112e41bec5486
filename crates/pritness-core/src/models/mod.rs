// ABOUTME: Core data models for the Pritness tracker
// ABOUTME: Re-exports profile, ledger entry, estimate and meal-time types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Data Models
//!
//! - `Profile`: biometrics, goal and the target set derived from them
//! - `DailyTotals`: materialized per-day aggregate
//! - `MealEntry`, `WodEntry`, `WaterLog`, `WeightLogEntry`: durable records
//! - `NutritionEstimate`, `WorkoutEstimate`, `MealSuggestion`: estimator output
//! - `MealTimeBucket`: the single hour-of-day classification
//! - `ChatTurn`: assistant conversation history

mod conversation;
mod estimate;
mod ledger;
mod meal_time;
mod profile;

pub use conversation::{ChatTurn, TurnRole};
pub use estimate::{
    EstimateOrigin, FoodItemEstimate, ImageEstimate, MealSuggestion, NutritionEstimate,
    SuggestionCategory, WorkoutEstimate,
};
pub use ledger::{
    DailySummary, DailyTotals, EntrySource, MealEntry, MealItem, MealTotals, WaterLog,
    WeightLogEntry, WodEntry,
};
pub use meal_time::{MealTimeBucket, MealType};
pub use profile::{Profile, ProfileDraft};
