// ABOUTME: Daily ledger records and the materialized per-day aggregate
// ABOUTME: MealEntry, WodEntry, WaterLog, WeightLogEntry and saturating DailyTotals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::meal_time::MealType;
use crate::intelligence::NutritionTargets;

/// How an entry was produced
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Typed in by the user or derived from text
    #[default]
    Manual,
    /// Produced by photo analysis or re-analysis
    AiVision,
}

impl EntrySource {
    /// Stored identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::AiVision => "ai_vision",
        }
    }
}

/// One component of a meal as estimated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealItem {
    /// Food name
    pub name: String,
    /// Kilocalories
    pub calories: u32,
    /// Protein grams
    pub protein_g: u32,
    /// Carbohydrate grams
    pub carbs_g: u32,
    /// Fat grams
    pub fat_g: u32,
    /// Portion description ("150 g", "1 cup")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion: Option<String>,
}

/// Calorie and macro values of a meal or a sum of meals
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealTotals {
    /// Kilocalories
    pub calories: u32,
    /// Protein grams
    pub protein_g: u32,
    /// Carbohydrate grams
    pub carbs_g: u32,
    /// Fat grams
    pub fat_g: u32,
}

impl MealTotals {
    /// Sum the nutritional values of `meals`
    pub fn sum<'a>(meals: impl IntoIterator<Item = &'a MealEntry>) -> Self {
        meals.into_iter().fold(Self::default(), |acc, meal| Self {
            calories: acc.calories.saturating_add(meal.calories),
            protein_g: acc.protein_g.saturating_add(meal.protein_g),
            carbs_g: acc.carbs_g.saturating_add(meal.carbs_g),
            fat_g: acc.fat_g.saturating_add(meal.fat_g),
        })
    }
}

/// One recorded food-consumption event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealEntry {
    /// Entry id, also the idempotency key for remote writes
    pub id: Uuid,
    /// Name or description
    pub name: String,
    /// Kilocalories
    pub calories: u32,
    /// Protein grams
    pub protein_g: u32,
    /// Carbohydrate grams
    pub carbs_g: u32,
    /// Fat grams
    pub fat_g: u32,
    /// Meal slot
    pub meal_type: MealType,
    /// Calendar date the meal belongs to (profile time zone)
    pub date: NaiveDate,
    /// Original text the user typed, kept for re-analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
    /// Estimated sub-items
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MealItem>,
    /// Provenance tag
    #[serde(default)]
    pub source: EntrySource,
}

impl MealEntry {
    /// New manual entry with a fresh id and no sub-items
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        totals: MealTotals,
        meal_type: MealType,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories: totals.calories,
            protein_g: totals.protein_g,
            carbs_g: totals.carbs_g,
            fat_g: totals.fat_g,
            meal_type,
            date,
            user_input: None,
            items: Vec::new(),
            source: EntrySource::Manual,
        }
    }

    /// Nutritional values of this entry
    #[must_use]
    pub const fn totals(&self) -> MealTotals {
        MealTotals {
            calories: self.calories,
            protein_g: self.protein_g,
            carbs_g: self.carbs_g,
            fat_g: self.fat_g,
        }
    }
}

/// One recorded workout session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WodEntry {
    /// Entry id
    pub id: Uuid,
    /// Calendar date of the session
    pub date: NaiveDate,
    /// Free-text description
    pub description: String,
    /// Exercise names
    #[serde(default)]
    pub exercises: Vec<String>,
    /// Estimated kilocalories burned
    pub estimated_calories_burned: u32,
    /// Provenance tag
    #[serde(default)]
    pub source: EntrySource,
}

/// One water intake record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaterLog {
    /// Entry id
    pub id: Uuid,
    /// Calendar date
    pub date: NaiveDate,
    /// Millilitres, always positive
    pub amount_ml: u32,
}

/// Point-in-time body weight measurement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightLogEntry {
    /// Entry id
    pub id: Uuid,
    /// Measurement instant
    pub recorded_at: DateTime<Utc>,
    /// Body weight in kilograms
    pub weight_kg: f64,
}

/// Materialized aggregate for one (profile, date)
///
/// Every subtraction saturates at zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyTotals {
    /// Kilocalories eaten
    pub eaten_kcal: u32,
    /// Kilocalories burned by workouts
    pub burned_kcal: u32,
    /// Protein grams eaten
    pub protein_eaten_g: u32,
    /// Carbohydrate grams eaten
    #[serde(default)]
    pub carbs_eaten_g: u32,
    /// Fat grams eaten
    #[serde(default)]
    pub fat_eaten_g: u32,
    /// Water millilitres drunk
    pub water_ml: u32,
}

impl DailyTotals {
    /// Add a meal's values
    pub fn add_meal(&mut self, meal: MealTotals) {
        self.eaten_kcal = self.eaten_kcal.saturating_add(meal.calories);
        self.protein_eaten_g = self.protein_eaten_g.saturating_add(meal.protein_g);
        self.carbs_eaten_g = self.carbs_eaten_g.saturating_add(meal.carbs_g);
        self.fat_eaten_g = self.fat_eaten_g.saturating_add(meal.fat_g);
    }

    /// Remove a meal's values, clamping at zero
    pub fn subtract_meal(&mut self, meal: MealTotals) {
        self.eaten_kcal = self.eaten_kcal.saturating_sub(meal.calories);
        self.protein_eaten_g = self.protein_eaten_g.saturating_sub(meal.protein_g);
        self.carbs_eaten_g = self.carbs_eaten_g.saturating_sub(meal.carbs_g);
        self.fat_eaten_g = self.fat_eaten_g.saturating_sub(meal.fat_g);
    }

    /// Calories still available: `max(0, target - eaten + burned)`
    #[must_use]
    pub fn remaining_calories(&self, targets: &NutritionTargets) -> u32 {
        let remaining = i64::from(targets.daily_calories_target) - i64::from(self.eaten_kcal)
            + i64::from(self.burned_kcal);
        u32::try_from(remaining.max(0)).unwrap_or(u32::MAX)
    }

    /// Protein grams still to eat, floored at zero
    #[must_use]
    pub const fn remaining_protein(&self, targets: &NutritionTargets) -> u32 {
        targets.protein_target_g.saturating_sub(self.protein_eaten_g)
    }

    /// True when nothing has been logged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Totals and targets for one (profile, date), as read by scheduled reminders
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    /// Owning profile
    pub profile_id: Uuid,
    /// Ledger date
    pub date: NaiveDate,
    /// Aggregate for the date
    pub totals: DailyTotals,
    /// Profile targets
    pub targets: NutritionTargets,
    /// Daily water goal
    pub water_target_ml: u32,
    /// `max(0, target - eaten + burned)`
    pub remaining_calories: u32,
    /// Protein grams still to eat
    pub remaining_protein_g: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(calories: u32) -> NutritionTargets {
        NutritionTargets {
            basal_metabolic_rate: f64::from(calories),
            daily_calories_target: calories,
            protein_target_g: 150,
            carbs_target_g: 200,
            fat_target_g: 60,
        }
    }

    #[test]
    fn test_remaining_calories_credits_burned() {
        let totals = DailyTotals {
            eaten_kcal: 1200,
            burned_kcal: 300,
            ..DailyTotals::default()
        };
        assert_eq!(totals.remaining_calories(&targets(2000)), 1100);
    }

    #[test]
    fn test_remaining_calories_floors_at_zero() {
        let totals = DailyTotals {
            eaten_kcal: 2600,
            ..DailyTotals::default()
        };
        assert_eq!(totals.remaining_calories(&targets(2000)), 0);
    }

    #[test]
    fn test_subtract_meal_saturates() {
        let mut totals = DailyTotals {
            eaten_kcal: 100,
            protein_eaten_g: 5,
            ..DailyTotals::default()
        };
        totals.subtract_meal(MealTotals {
            calories: 400,
            protein_g: 30,
            carbs_g: 10,
            fat_g: 2,
        });
        assert!(totals.is_empty());
    }
}
