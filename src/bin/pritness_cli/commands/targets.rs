// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness
// ABOUTME: Goal engine and meal-time bucket diagnostics
// ABOUTME: Derives targets from command-line biometrics, optionally cross-checked by the estimator

use pritness::config::AppConfig;
use pritness::errors::{AppError, AppResult};
use pritness::estimation::{LlmEstimationGateway, NutritionEstimationGateway};
use pritness::intelligence::{derive_targets, BiometricInput, Goal, Sex, TargetCrossCheck};
use pritness::models::MealTimeBucket;

use crate::helpers::display::{display_bucket, display_cross_check, display_targets};

/// Derive and print targets; with `cross_check` also ask the configured estimator
pub async fn targets(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: &str,
    goal: &str,
    cross_check: bool,
) -> AppResult<()> {
    let goal = Goal::parse(goal)
        .ok_or_else(|| AppError::invalid_input(format!("unknown goal: {goal}")))?;
    let input = BiometricInput {
        weight_kg,
        height_cm,
        age,
        sex: Sex::from_str_lossy(Some(sex)),
    };
    let targets = derive_targets(&input, goal)?;
    display_targets(&input, goal, &targets);
    if !cross_check {
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let gateway = LlmEstimationGateway::from_config(&config)?;
    let estimated = gateway.recommend_targets(&input, goal).await?;
    display_cross_check(&TargetCrossCheck {
        computed: targets,
        estimated,
    });
    Ok(())
}

/// Print the bucket for one hour, or the whole day
pub fn bucket(hour: Option<u32>) -> AppResult<()> {
    match hour {
        Some(hour) if hour > 23 => Err(AppError::invalid_input("hour must be between 0 and 23")),
        Some(hour) => {
            display_bucket(hour, MealTimeBucket::from_hour(hour));
            Ok(())
        }
        None => {
            for hour in 0..24 {
                display_bucket(hour, MealTimeBucket::from_hour(hour));
            }
            Ok(())
        }
    }
}
