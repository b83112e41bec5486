// ABOUTME: Goal engine deriving BMR and daily calorie/macro targets from biometrics
// ABOUTME: Mifflin-St Jeor BMR plus goal-specific calorie multiplier and macro split
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! Goal engine
//!
//! Pure and deterministic. The arithmetic contract is pinned so any other
//! estimator applying the same table reproduces the same integers:
//!
//! 1. `bmr = 10*w + 6.25*h - 5*age + c` evaluated left to right, `c = +5` (male) or `-161` (female)
//! 2. `calories = round(bmr * multiplier)`
//! 3. `grams = round(calories * pct / kcal_per_gram)` using the rounded calorie target
//!
//! `round` is [`f64::round`], i.e. half away from zero.

use serde::{Deserialize, Serialize};

use crate::constants::{bmr, biometrics, cross_check, energy};
use crate::errors::{AppError, AppResult};

/// Biological sex used by the BMR equation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Male constant (+5)
    Male,
    /// Female constant (-161)
    Female,
}

impl Sex {
    /// Stored identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse a stored value; anything other than `male` uses the female constant
    #[must_use]
    pub fn from_str_lossy(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("male") => Self::Male,
            _ => Self::Female,
        }
    }

    const fn bmr_constant(self) -> f64 {
        match self {
            Self::Male => bmr::MALE_CONSTANT,
            Self::Female => bmr::FEMALE_CONSTANT,
        }
    }
}

/// Goal selection driving the calorie multiplier and macro split
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric deficit
    #[serde(alias = "perder_peso")]
    LoseWeight,
    /// Caloric surplus
    #[serde(alias = "ganar_masa")]
    GainMuscle,
    /// Maintenance with higher carbohydrate share
    #[serde(alias = "definir_masa")]
    DefineMuscle,
}

impl Goal {
    /// Stable identifier used in storage and prompts
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoseWeight => "lose_weight",
            Self::GainMuscle => "gain_muscle",
            Self::DefineMuscle => "define_muscle",
        }
    }

    /// Parse a goal identifier, accepting legacy stored values
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "lose_weight" | "perder_peso" => Some(Self::LoseWeight),
            "gain_muscle" | "ganar_masa" => Some(Self::GainMuscle),
            "define_muscle" | "definir_masa" => Some(Self::DefineMuscle),
            _ => None,
        }
    }
}

/// Calorie multiplier and macro percentages for one goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSplit {
    /// Applied to BMR to obtain the daily calorie target
    pub calorie_multiplier: f64,
    /// Share of calories from protein
    pub protein_pct: f64,
    /// Share of calories from carbohydrate
    pub carbs_pct: f64,
    /// Share of calories from fat
    pub fat_pct: f64,
}

impl GoalSplit {
    /// Table entry for `goal`
    #[must_use]
    pub const fn for_goal(goal: Goal) -> Self {
        match goal {
            Goal::LoseWeight => Self {
                calorie_multiplier: 0.85,
                protein_pct: 0.30,
                carbs_pct: 0.45,
                fat_pct: 0.25,
            },
            Goal::GainMuscle => Self {
                calorie_multiplier: 1.10,
                protein_pct: 0.25,
                carbs_pct: 0.50,
                fat_pct: 0.25,
            },
            Goal::DefineMuscle => Self {
                calorie_multiplier: 1.00,
                protein_pct: 0.25,
                carbs_pct: 0.50,
                fat_pct: 0.25,
            },
        }
    }
}

/// Inputs to the BMR equation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BiometricInput {
    /// Body weight in kilograms, (0, 300]
    pub weight_kg: f64,
    /// Height in centimetres, (0, 250]
    pub height_cm: f64,
    /// Age in years, [10, 120]
    pub age: u32,
    /// Biological sex
    pub sex: Sex,
}

impl BiometricInput {
    /// Reject out-of-range values, naming the offending field
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricInput` for the first field outside its range.
    pub fn validate(&self) -> AppResult<()> {
        if !self.weight_kg.is_finite()
            || self.weight_kg <= 0.0
            || self.weight_kg > biometrics::MAX_WEIGHT_KG
        {
            return Err(AppError::invalid_biometric(
                "weight_kg",
                format!(
                    "weight must be greater than 0 and at most {} kg",
                    biometrics::MAX_WEIGHT_KG
                ),
            ));
        }
        if !self.height_cm.is_finite()
            || self.height_cm <= 0.0
            || self.height_cm > biometrics::MAX_HEIGHT_CM
        {
            return Err(AppError::invalid_biometric(
                "height_cm",
                format!(
                    "height must be greater than 0 and at most {} cm",
                    biometrics::MAX_HEIGHT_CM
                ),
            ));
        }
        if !(biometrics::MIN_AGE..=biometrics::MAX_AGE).contains(&self.age) {
            return Err(AppError::invalid_biometric(
                "age",
                format!(
                    "age must be between {} and {} years",
                    biometrics::MIN_AGE,
                    biometrics::MAX_AGE
                ),
            ));
        }
        Ok(())
    }
}

/// Daily targets derived as one unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutritionTargets {
    /// Basal metabolic rate in kcal/day (unrounded)
    pub basal_metabolic_rate: f64,
    /// Daily calorie target
    pub daily_calories_target: u32,
    /// Protein target in grams
    pub protein_target_g: u32,
    /// Carbohydrate target in grams
    pub carbs_target_g: u32,
    /// Fat target in grams
    pub fat_target_g: u32,
}

/// Mifflin-St Jeor basal metabolic rate
///
/// Range checking is the caller's job (see [`BiometricInput::validate`]).
#[must_use]
pub fn compute_bmr(input: &BiometricInput) -> f64 {
    bmr::WEIGHT_COEFFICIENT * input.weight_kg + bmr::HEIGHT_COEFFICIENT * input.height_cm
        - bmr::AGE_COEFFICIENT * f64::from(input.age)
        + input.sex.bmr_constant()
}

/// Calorie and macro targets for `bmr` under `goal`
#[must_use]
pub fn compute_targets(bmr: f64, goal: Goal) -> NutritionTargets {
    let split = GoalSplit::for_goal(goal);
    let daily_calories_target = round_non_negative(bmr * split.calorie_multiplier);
    let calories = f64::from(daily_calories_target);

    NutritionTargets {
        basal_metabolic_rate: bmr,
        daily_calories_target,
        protein_target_g: round_non_negative(
            calories * split.protein_pct / energy::KCAL_PER_GRAM_PROTEIN,
        ),
        carbs_target_g: round_non_negative(calories * split.carbs_pct / energy::KCAL_PER_GRAM_CARBS),
        fat_target_g: round_non_negative(calories * split.fat_pct / energy::KCAL_PER_GRAM_FAT),
    }
}

/// Validate, compute BMR, then derive targets
///
/// # Errors
///
/// Returns `InvalidBiometricInput` when `input` fails validation.
pub fn derive_targets(input: &BiometricInput, goal: Goal) -> AppResult<NutritionTargets> {
    input.validate()?;
    Ok(compute_targets(compute_bmr(input), goal))
}

/// Local targets next to an independent estimate for the same inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetCrossCheck {
    /// Targets from [`compute_targets`]
    pub computed: NutritionTargets,
    /// Targets proposed by the external estimator
    pub estimated: NutritionTargets,
}

impl TargetCrossCheck {
    /// Estimated minus computed daily calories
    #[must_use]
    pub fn calorie_delta(&self) -> i64 {
        i64::from(self.estimated.daily_calories_target)
            - i64::from(self.computed.daily_calories_target)
    }

    /// Largest absolute gap across protein, carbs and fat
    #[must_use]
    pub fn max_macro_delta_g(&self) -> u32 {
        let computed = &self.computed;
        let estimated = &self.estimated;
        computed
            .protein_target_g
            .abs_diff(estimated.protein_target_g)
            .max(computed.carbs_target_g.abs_diff(estimated.carbs_target_g))
            .max(computed.fat_target_g.abs_diff(estimated.fat_target_g))
    }

    /// Both target sets are within tolerance of each other
    #[must_use]
    pub fn agrees(&self) -> bool {
        self.calorie_delta().unsigned_abs() <= u64::from(cross_check::CALORIE_TOLERANCE_KCAL)
            && self.max_macro_delta_g() <= cross_check::MACRO_TOLERANCE_G
    }
}

// Negative results only arise from extreme in-range combinations (very old, very light)
fn round_non_negative(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn male_70_175_25() -> BiometricInput {
        BiometricInput {
            weight_kg: 70.0,
            height_cm: 175.0,
            age: 25,
            sex: Sex::Male,
        }
    }

    #[test]
    fn test_bmr_male_reference() {
        assert!((compute_bmr(&male_70_175_25()) - 1673.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bmr_female_constant() {
        let input = BiometricInput {
            sex: Sex::Female,
            ..male_70_175_25()
        };
        assert!((compute_bmr(&input) - 1507.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(round_non_negative(1673.5), 1674);
        assert_eq!(round_non_negative(46.5), 47);
        assert_eq!(round_non_negative(-12.0), 0);
    }

    #[test]
    fn test_cross_check_tolerances() {
        let computed = compute_targets(compute_bmr(&male_70_175_25()), Goal::DefineMuscle);
        let close = TargetCrossCheck {
            computed,
            estimated: NutritionTargets {
                daily_calories_target: computed.daily_calories_target - 50,
                protein_target_g: computed.protein_target_g + 10,
                ..computed
            },
        };
        assert_eq!(close.calorie_delta(), -50);
        assert_eq!(close.max_macro_delta_g(), 10);
        assert!(close.agrees());

        let far = TargetCrossCheck {
            computed,
            estimated: NutritionTargets {
                fat_target_g: computed.fat_target_g + 11,
                ..computed
            },
        };
        assert!(!far.agrees());
    }

    #[test]
    fn test_goal_parse_accepts_legacy_values() {
        assert_eq!(Goal::parse("perder_peso"), Some(Goal::LoseWeight));
        assert_eq!(Goal::parse("Gain_Muscle"), Some(Goal::GainMuscle));
        assert_eq!(Goal::parse("bulk"), None);
    }
}
