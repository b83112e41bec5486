// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Energy conversion factors, biometric ranges and tracker limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

/// Energy density of macronutrients
pub mod energy {
    /// Kilocalories per gram of protein
    pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
    /// Kilocalories per gram of carbohydrate
    pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
    /// Kilocalories per gram of fat
    pub const KCAL_PER_GRAM_FAT: f64 = 9.0;
}

/// Mifflin-St Jeor coefficients
pub mod bmr {
    /// Weight coefficient (kcal per kg)
    pub const WEIGHT_COEFFICIENT: f64 = 10.0;
    /// Height coefficient (kcal per cm)
    pub const HEIGHT_COEFFICIENT: f64 = 6.25;
    /// Age coefficient (kcal per year)
    pub const AGE_COEFFICIENT: f64 = 5.0;
    /// Male constant
    pub const MALE_CONSTANT: f64 = 5.0;
    /// Female constant
    pub const FEMALE_CONSTANT: f64 = -161.0;
}

/// Accepted biometric ranges
pub mod biometrics {
    /// Weight upper bound (kg, inclusive); lower bound is exclusive zero
    pub const MAX_WEIGHT_KG: f64 = 300.0;
    /// Height upper bound (cm, inclusive); lower bound is exclusive zero
    pub const MAX_HEIGHT_CM: f64 = 250.0;
    /// Youngest supported age
    pub const MIN_AGE: u32 = 10;
    /// Oldest supported age
    pub const MAX_AGE: u32 = 120;
}

/// Daily tracking limits and defaults
pub mod tracking {
    /// Default daily water target
    pub const DEFAULT_WATER_TARGET_ML: u32 = 2000;
    /// Body weight assumed for workout estimates when the profile has none
    pub const DEFAULT_WORKOUT_WEIGHT_KG: f64 = 70.0;
    /// Most recent liked/disliked food labels retained per list
    pub const MAX_FOOD_PREFERENCES: usize = 30;
    /// Chat turns folded into the recommendation summary
    pub const CHAT_SUMMARY_TURNS: usize = 20;
    /// Character cap on the recommendation chat summary
    pub const CHAT_SUMMARY_MAX_CHARS: usize = 2000;
    /// Chat turns kept in a session
    pub const MAX_CHAT_HISTORY: usize = 40;
    /// Meal suggestions requested per recommendation call
    pub const SUGGESTIONS_PER_REQUEST: usize = 3;
}

/// Body mass index thresholds
pub mod bmi {
    /// Below this value is underweight
    pub const UNDERWEIGHT_BELOW: f64 = 18.5;
    /// Below this value (and at least underweight bound) is normal
    pub const NORMAL_BELOW: f64 = 25.0;
    /// Below this value is overweight, otherwise obese
    pub const OVERWEIGHT_BELOW: f64 = 30.0;
}

/// Independent target estimates
pub mod cross_check {
    /// Calorie target assumed when an estimate omits it
    pub const FALLBACK_CALORIES: u32 = 2000;
    /// Protein grams assumed when an estimate omits them
    pub const FALLBACK_PROTEIN_G: u32 = 120;
    /// Carbohydrate grams assumed when an estimate omits them
    pub const FALLBACK_CARBS_G: u32 = 200;
    /// Fat grams assumed when an estimate omits them
    pub const FALLBACK_FAT_G: u32 = 65;
    /// Largest calorie gap still counted as agreement
    pub const CALORIE_TOLERANCE_KCAL: u32 = 50;
    /// Largest gap per macro still counted as agreement
    pub const MACRO_TOLERANCE_G: u32 = 10;
}
