// ABOUTME: Estimator prompts loaded at compile time from markdown templates
// ABOUTME: Renders the workout, target and meal-suggestion messages from request inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Estimation Prompts
//!
//! Prompts live next to this module as markdown files so they can be edited
//! without touching code. Templates use `{name}` placeholders.

use pritness_core::intelligence::{BiometricInput, Goal};
use pritness_core::models::SuggestionCategory;
use pritness_intelligence::RecommendationContext;

/// System prompt for free-text meal estimates
pub const MEAL_TEXT_PROMPT: &str = include_str!("meal_text.md");

/// Prompt for the combined food/workout photo call
pub const IMAGE_PROMPT: &str = include_str!("image.md");

/// System prompt for the independent daily target estimate
pub const TARGETS_PROMPT: &str = include_str!("targets.md");

/// System prompt for the conversational assistant
pub const CHAT_SYSTEM_PROMPT: &str = include_str!("chat.md");

const WORKOUT_TEMPLATE: &str = include_str!("workout.md");
const SUGGESTIONS_TEMPLATE: &str = include_str!("suggestions.md");

/// User message wrapping a meal description
#[must_use]
pub fn meal_text_message(description: &str) -> String {
    format!("User: \"{}\"", description.trim())
}

/// User message describing the biometrics behind a target estimate
#[must_use]
pub fn targets_message(input: &BiometricInput, goal: Goal) -> String {
    format!(
        "Weight: {} kg, height: {} cm, age: {}, sex: {}, goal: {}.",
        input.weight_kg,
        input.height_cm,
        input.age,
        input.sex.as_str(),
        goal.as_str()
    )
}

/// Workout prompt for `description` at `weight_kg`
#[must_use]
pub fn workout_prompt(description: &str, weight_kg: f64) -> String {
    WORKOUT_TEMPLATE
        .replace("{description}", description.trim())
        .replace("{weight_kg}", &format!("{weight_kg:.0}"))
}

/// Suggestion prompt asking for `count` meals
#[must_use]
pub fn suggestions_prompt(context: &RecommendationContext, count: usize) -> String {
    let country_line = context.country.as_deref().map_or_else(
        || "- Suggest affordable foods found in any supermarket.".to_owned(),
        |country| {
            format!("- User country: {country}. Suggest typical, affordable foods common there.")
        },
    );
    let disliked_line = if context.disliked_foods.is_empty() {
        String::new()
    } else {
        format!(
            "- Foods the user does NOT want recommended: {}. Never include them.",
            context.disliked_foods.join(", ")
        )
    };
    let categories = SuggestionCategory::ALL
        .iter()
        .map(|category| category.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    SUGGESTIONS_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{hour}", &context.hour.to_string())
        .replace("{meal_time}", context.meal_time.prompt_label())
        .replace("{remaining_calories}", &context.remaining_calories.to_string())
        .replace("{remaining_protein}", &context.remaining_protein_g.to_string())
        .replace("{goal}", context.goal.as_str())
        .replace("{country_line}", &country_line)
        .replace("{disliked_line}", &disliked_line)
        .replace("{chat_summary}", &context.chat_summary)
        .replace("{categories}", &categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pritness_core::intelligence::Sex;
    use pritness_core::models::MealTimeBucket;

    fn context() -> RecommendationContext {
        RecommendationContext {
            remaining_calories: 650,
            remaining_protein_g: 40,
            meal_time: MealTimeBucket::Midday,
            hour: 13,
            goal: Goal::GainMuscle,
            country: Some("Chile".to_owned()),
            disliked_foods: vec!["tuna".to_owned(), "liver".to_owned()],
            chat_summary: "User: no dairy please".to_owned(),
        }
    }

    #[test]
    fn test_suggestions_prompt_fills_every_placeholder() {
        let prompt = suggestions_prompt(&context(), 3);
        assert!(!prompt.contains('{'));
        assert!(prompt.contains("13:00 (time of day: lunch)"));
        assert!(prompt.contains("650 kcal"));
        assert!(prompt.contains("tuna, liver"));
        assert!(prompt.contains("Chile"));
        assert!(prompt.contains("no dairy please"));
    }

    #[test]
    fn test_targets_message_names_every_input() {
        let input = BiometricInput {
            weight_kg: 72.5,
            height_cm: 180.0,
            age: 41,
            sex: Sex::Male,
        };
        assert_eq!(
            targets_message(&input, Goal::GainMuscle),
            "Weight: 72.5 kg, height: 180 cm, age: 41, sex: male, goal: gain_muscle."
        );
        assert!(TARGETS_PROMPT.contains("dailyCaloriesTarget"));
    }

    #[test]
    fn test_workout_prompt_includes_weight() {
        let prompt = workout_prompt("  5 rounds of 10 burpees ", 70.0);
        assert!(prompt.contains("\"5 rounds of 10 burpees\""));
        assert!(prompt.contains("70 kg"));
    }
}
