// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness
// ABOUTME: Output formatting helpers for pritness-cli
// ABOUTME: Prints targets, nutrition estimates and workout estimates consistently

use pritness::intelligence::{BiometricInput, Goal, NutritionTargets, TargetCrossCheck};
use pritness::models::{
    EstimateOrigin, ImageEstimate, MealTimeBucket, NutritionEstimate, WorkoutEstimate,
};

fn origin_label(origin: &EstimateOrigin) -> &str {
    match origin {
        EstimateOrigin::Provider { name } => name.as_str(),
        EstimateOrigin::Unconfigured => "not configured",
    }
}

/// Print the derived target set
pub fn display_targets(input: &BiometricInput, goal: Goal, targets: &NutritionTargets) {
    println!("\nDaily targets");
    println!("{}", "=".repeat(40));
    println!(
        "   Input: {} kg, {} cm, {} y, {}",
        input.weight_kg,
        input.height_cm,
        input.age,
        input.sex.as_str()
    );
    println!("   Goal: {}", goal.as_str());
    println!("   BMR: {:.1} kcal", targets.basal_metabolic_rate);
    println!("   Calories: {} kcal", targets.daily_calories_target);
    println!("   Protein: {} g", targets.protein_target_g);
    println!("   Carbs: {} g", targets.carbs_target_g);
    println!("   Fat: {} g", targets.fat_target_g);
}

/// Print an estimator's targets against the goal engine's
pub fn display_cross_check(check: &TargetCrossCheck) {
    let estimated = &check.estimated;
    println!("\nEstimator cross-check");
    println!("{}", "=".repeat(40));
    println!(
        "   Calories: {} kcal ({:+})",
        estimated.daily_calories_target,
        check.calorie_delta()
    );
    println!(
        "   Protein {} g | Carbs {} g | Fat {} g (max gap {} g)",
        estimated.protein_target_g,
        estimated.carbs_target_g,
        estimated.fat_target_g,
        check.max_macro_delta_g()
    );
    println!(
        "   Verdict: {}",
        if check.agrees() { "agrees" } else { "disagrees" }
    );
}

/// Print the meal-time bucket for an hour
pub fn display_bucket(hour: u32, bucket: MealTimeBucket) {
    println!(
        "{hour:02}:00 -> {:?} (logged as {}, suggestions for {})",
        bucket,
        bucket.meal_type().as_str(),
        bucket.prompt_label()
    );
}

/// Print a meal estimate with its items
pub fn display_nutrition(estimate: &NutritionEstimate) {
    println!("\nMeal estimate ({})", origin_label(&estimate.origin));
    println!("{}", "=".repeat(40));
    println!("   {}", estimate.description);
    println!(
        "   {} kcal | P {} g | C {} g | F {} g",
        estimate.calories, estimate.protein_g, estimate.carbs_g, estimate.fat_g
    );
    for item in &estimate.items {
        let portion = item.portion.as_deref().unwrap_or("-");
        println!(
            "   - {} ({portion}): {} kcal, P {} g",
            item.name, item.calories, item.protein_g
        );
    }
}

/// Print a workout estimate
pub fn display_workout(estimate: &WorkoutEstimate) {
    println!("\nWorkout estimate ({})", origin_label(&estimate.origin));
    println!("{}", "=".repeat(40));
    println!("   {}", estimate.description);
    println!("   Burned: {} kcal", estimate.estimated_calories_burned);
    if !estimate.exercises.is_empty() {
        println!("   Exercises: {}", estimate.exercises.join(", "));
    }
}

/// Print a classified photo estimate
pub fn display_image(estimate: &ImageEstimate) {
    match estimate {
        ImageEstimate::Food(meal) => display_nutrition(meal),
        ImageEstimate::Workout(wod) => display_workout(wod),
    }
}
