// ABOUTME: Tolerant parsing of estimator answers into nutrition and workout estimates
// ABOUTME: Strips code fences, rejects numeric strings, rounds and clamps to whole units
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Answer Parsing
//!
//! Providers are asked for bare JSON but often wrap it in a markdown fence.
//! Numbers are accepted only as JSON numbers; a quoted `"450"` is treated as
//! a malformed answer rather than silently coerced. Missing macros count as
//! zero. Every value is rounded half away from zero and clamped at zero.

use pritness_core::constants::cross_check;
use pritness_core::intelligence::NutritionTargets;
use pritness_core::models::{
    EstimateOrigin, FoodItemEstimate, ImageEstimate, MealSuggestion, NutritionEstimate,
    SuggestionCategory, WorkoutEstimate,
};
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

type Object = Map<String, Value>;

/// Remove a surrounding markdown code fence, with or without a `json` tag
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_json(provider: &str, text: &str) -> AppResult<Value> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| {
        AppError::estimation_failed(provider, format!("answer is not valid JSON: {e}"))
    })
}

fn as_object<'a>(provider: &str, value: &'a Value, what: &str) -> AppResult<&'a Object> {
    value.as_object().ok_or_else(|| {
        AppError::estimation_failed(provider, format!("expected a JSON object for {what}"))
    })
}

/// Whole non-negative value of `key`; absent or null reads as zero
fn whole_number(provider: &str, object: &Object, key: &str) -> AppResult<u32> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(number)) => {
            let value = number.as_f64().unwrap_or(0.0).round();
            Ok(value.clamp(0.0, f64::from(u32::MAX)) as u32)
        }
        Some(other) => Err(AppError::estimation_failed(
            provider,
            format!("field {key} must be a number, got {other}"),
        )),
    }
}

fn text_field(object: &Object, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn string_list(object: &Object, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn food_item(provider: &str, value: &Value) -> AppResult<FoodItemEstimate> {
    let object = as_object(provider, value, "an item")?;
    Ok(FoodItemEstimate {
        name: text_field(object, "name").unwrap_or_default(),
        calories: whole_number(provider, object, "calories")?,
        protein_g: whole_number(provider, object, "protein")?,
        carbs_g: whole_number(provider, object, "carbs")?,
        fat_g: whole_number(provider, object, "fat")?,
        portion: text_field(object, "portion"),
    })
}

fn nutrition_from_object(provider: &str, object: &Object) -> AppResult<NutritionEstimate> {
    let items = match object.get("items") {
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| food_item(provider, value))
            .collect::<AppResult<Vec<_>>>()?,
        _ => Vec::new(),
    };
    Ok(NutritionEstimate {
        calories: whole_number(provider, object, "calories")?,
        protein_g: whole_number(provider, object, "protein")?,
        carbs_g: whole_number(provider, object, "carbs")?,
        fat_g: whole_number(provider, object, "fat")?,
        description: text_field(object, "description").unwrap_or_default(),
        items,
        origin: EstimateOrigin::Provider {
            name: provider.to_owned(),
        },
    })
}

fn workout_from_object(provider: &str, object: &Object) -> AppResult<WorkoutEstimate> {
    Ok(WorkoutEstimate {
        description: text_field(object, "description").unwrap_or_default(),
        exercises: string_list(object, "exercises"),
        estimated_calories_burned: whole_number(provider, object, "estimatedCaloriesBurned")?,
        origin: EstimateOrigin::Provider {
            name: provider.to_owned(),
        },
    })
}

/// Parse a meal estimate answer
///
/// # Errors
///
/// Returns `EstimationFailed` for non-JSON answers or non-numeric values.
pub fn parse_nutrition(provider: &str, text: &str) -> AppResult<NutritionEstimate> {
    let value = parse_json(provider, text)?;
    nutrition_from_object(provider, as_object(provider, &value, "a meal")?)
}

/// Parse a workout estimate answer
///
/// # Errors
///
/// Returns `EstimationFailed` for non-JSON answers or non-numeric values.
pub fn parse_workout(provider: &str, text: &str) -> AppResult<WorkoutEstimate> {
    let value = parse_json(provider, text)?;
    workout_from_object(provider, as_object(provider, &value, "a workout")?)
}

/// Parse the classified photo answer
///
/// # Errors
///
/// Returns `EstimationFailed` when the type tag is missing or unknown.
pub fn parse_image(provider: &str, text: &str) -> AppResult<ImageEstimate> {
    let value = parse_json(provider, text)?;
    let object = as_object(provider, &value, "an image answer")?;
    let kind = object.get("type").and_then(Value::as_str).map(str::to_lowercase);

    match (kind.as_deref(), object.get("meal"), object.get("wod")) {
        (Some("workout"), _, Some(wod)) => Ok(ImageEstimate::Workout(workout_from_object(
            provider,
            as_object(provider, wod, "a workout")?,
        )?)),
        (Some("food"), Some(meal), _) => Ok(ImageEstimate::Food(nutrition_from_object(
            provider,
            as_object(provider, meal, "a meal")?,
        )?)),
        (other, _, _) => Err(AppError::estimation_failed(
            provider,
            format!("unrecognized image classification {other:?}"),
        )),
    }
}

/// Parse an independent daily target estimate
///
/// Missing or zero values take the fallback targets. The model is not asked
/// for a BMR, so `basal_metabolic_rate` comes from the caller.
///
/// # Errors
///
/// Returns `EstimationFailed` for non-JSON answers or non-numeric values.
pub fn parse_targets(
    provider: &str,
    text: &str,
    basal_metabolic_rate: f64,
) -> AppResult<NutritionTargets> {
    let value = parse_json(provider, text)?;
    let object = as_object(provider, &value, "targets")?;
    let target = |key: &str, fallback: u32| {
        whole_number(provider, object, key).map(|v| if v == 0 { fallback } else { v })
    };
    Ok(NutritionTargets {
        basal_metabolic_rate,
        daily_calories_target: target("dailyCaloriesTarget", cross_check::FALLBACK_CALORIES)?,
        protein_target_g: target("proteinTarget", cross_check::FALLBACK_PROTEIN_G)?,
        carbs_target_g: target("carbsTarget", cross_check::FALLBACK_CARBS_G)?,
        fat_target_g: target("fatTarget", cross_check::FALLBACK_FAT_G)?,
    })
}

/// Parse a suggestion array, keeping at most `limit` entries
///
/// # Errors
///
/// Returns `EstimationFailed` when the answer is not a JSON array.
pub fn parse_suggestions(provider: &str, text: &str, limit: usize) -> AppResult<Vec<MealSuggestion>> {
    let value = parse_json(provider, text)?;
    let Value::Array(entries) = value else {
        return Err(AppError::estimation_failed(provider, "expected a JSON array of suggestions"));
    };

    entries
        .iter()
        .take(limit)
        .map(|entry| {
            let object = as_object(provider, entry, "a suggestion")?;
            Ok(MealSuggestion {
                label: text_field(object, "label").unwrap_or_default(),
                description: text_field(object, "description").unwrap_or_default(),
                calories: whole_number(provider, object, "calories")?,
                protein_g: whole_number(provider, object, "protein")?,
                carbs_g: whole_number(provider, object, "carbs")?,
                fat_g: whole_number(provider, object, "fat")?,
                image_category: text_field(object, "imageCategory")
                    .map_or_else(SuggestionCategory::default, |raw| {
                        SuggestionCategory::from_str_lossy(&raw)
                    }),
                ingredients: string_list(object, "ingredients"),
                recipe: string_list(object, "recipe"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_fenced_answer_is_accepted() {
        let answer = "```json\n{\"calories\": 450, \"protein\": 30.4, \"description\": \"Rice and chicken\"}\n```";
        let estimate = parse_nutrition("groq", answer).unwrap();
        assert_eq!(estimate.calories, 450);
        assert_eq!(estimate.protein_g, 30);
        assert_eq!(estimate.carbs_g, 0);
        assert_eq!(estimate.fat_g, 0);
        assert_eq!(estimate.description, "Rice and chicken");
    }

    #[test]
    fn test_numeric_strings_are_rejected() {
        let error = parse_nutrition("groq", r#"{"calories": "450", "protein": 20}"#).unwrap_err();
        assert_eq!(error.code, ErrorCode::EstimationFailed);
    }

    #[test]
    fn test_negative_and_fractional_values_are_clamped_and_rounded() {
        let estimate = parse_nutrition("groq", r#"{"calories": -20, "fat": 2.5, "carbs": 7.49}"#).unwrap();
        assert_eq!(estimate.calories, 0);
        assert_eq!(estimate.fat_g, 3);
        assert_eq!(estimate.carbs_g, 7);
    }

    #[test]
    fn test_plain_prose_is_estimation_failure() {
        let error = parse_nutrition("gemini", "I could not see any food").unwrap_err();
        assert_eq!(error.code, ErrorCode::EstimationFailed);
    }

    #[test]
    fn test_targets_fill_missing_fields() {
        let targets = parse_targets(
            "groq",
            "```json\n{\"dailyCaloriesTarget\": 1799.6, \"proteinTarget\": 0}\n```",
            1673.75,
        )
        .unwrap();
        assert_eq!(targets.daily_calories_target, 1800);
        assert_eq!(targets.protein_target_g, 120);
        assert_eq!(targets.carbs_target_g, 200);
        assert_eq!(targets.fat_target_g, 65);
        assert!((targets.basal_metabolic_rate - 1673.75).abs() < f64::EPSILON);

        let error = parse_targets("groq", r#"{"fatTarget": "60"}"#, 0.0).unwrap_err();
        assert_eq!(error.code, ErrorCode::EstimationFailed);
    }

    #[test]
    fn test_image_workout_classification() {
        let answer = r#"{"type":"workout","wod":{"description":"AMRAP","exercises":["burpees"],"estimatedCaloriesBurned":312.6}}"#;
        match parse_image("groq", answer).unwrap() {
            ImageEstimate::Workout(wod) => {
                assert_eq!(wod.estimated_calories_burned, 313);
                assert_eq!(wod.exercises, vec!["burpees".to_owned()]);
            }
            ImageEstimate::Food(_) => panic!("expected a workout"),
        }
    }

    #[test]
    fn test_image_unknown_type_fails() {
        let error = parse_image("groq", r#"{"type":"selfie"}"#).unwrap_err();
        assert_eq!(error.code, ErrorCode::EstimationFailed);
    }

    #[test]
    fn test_suggestions_are_capped_and_categories_lossy() {
        let answer = r#"[
            {"label":"A","calories":400,"imageCategory":"Chicken"},
            {"label":"B","calories":300,"imageCategory":"sushi"},
            {"label":"C","calories":200},
            {"label":"D","calories":100}
        ]"#;
        let suggestions = parse_suggestions("groq", answer, 3).unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].image_category, SuggestionCategory::Chicken);
        assert_eq!(suggestions[1].image_category, SuggestionCategory::Generic);
    }
}
