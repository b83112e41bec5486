// ABOUTME: Output shapes of the nutrition estimation gateway
// ABOUTME: NutritionEstimate, WorkoutEstimate, image classification and meal suggestions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ledger::{EntrySource, MealEntry, MealItem, MealTotals, WodEntry};
use super::meal_time::MealType;

/// Where an estimate came from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateOrigin {
    /// Answered by the named provider
    Provider {
        /// Provider identifier (e.g. "groq")
        name: String,
    },
    /// No provider configured; values are zero placeholders
    #[default]
    Unconfigured,
}

/// Per-item breakdown returned with an estimate
pub type FoodItemEstimate = MealItem;

/// Estimated nutrition for a described or photographed meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutritionEstimate {
    /// Kilocalories
    pub calories: u32,
    /// Protein grams
    pub protein_g: u32,
    /// Carbohydrate grams
    pub carbs_g: u32,
    /// Fat grams
    pub fat_g: u32,
    /// Short description of what was estimated
    pub description: String,
    /// Component breakdown
    #[serde(default)]
    pub items: Vec<FoodItemEstimate>,
    /// Provenance
    #[serde(default)]
    pub origin: EstimateOrigin,
}

impl NutritionEstimate {
    /// Zero-valued placeholder labelled as unconfigured
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            calories: 0,
            protein_g: 0,
            carbs_g: 0,
            fat_g: 0,
            description: "AI estimation is not configured; add a provider API key".to_owned(),
            items: Vec::new(),
            origin: EstimateOrigin::Unconfigured,
        }
    }

    /// True for the unconfigured placeholder
    #[must_use]
    pub const fn is_unconfigured(&self) -> bool {
        matches!(self.origin, EstimateOrigin::Unconfigured)
    }

    /// Nutritional values of the estimate
    #[must_use]
    pub const fn totals(&self) -> MealTotals {
        MealTotals {
            calories: self.calories,
            protein_g: self.protein_g,
            carbs_g: self.carbs_g,
            fat_g: self.fat_g,
        }
    }

    /// Build a fresh meal entry from this estimate
    #[must_use]
    pub fn into_meal_entry(
        self,
        meal_type: MealType,
        date: NaiveDate,
        user_input: Option<String>,
        source: EntrySource,
    ) -> MealEntry {
        MealEntry {
            id: Uuid::new_v4(),
            name: self.description,
            calories: self.calories,
            protein_g: self.protein_g,
            carbs_g: self.carbs_g,
            fat_g: self.fat_g,
            meal_type,
            date,
            user_input,
            items: self.items,
            source,
        }
    }

    /// Copy of `entry` with nutritional fields replaced by this estimate
    ///
    /// Id, meal type and date are kept so the replacement targets the same record.
    #[must_use]
    pub fn reanalyzed(self, entry: &MealEntry, user_input: String) -> MealEntry {
        MealEntry {
            id: entry.id,
            name: self.description,
            calories: self.calories,
            protein_g: self.protein_g,
            carbs_g: self.carbs_g,
            fat_g: self.fat_g,
            meal_type: entry.meal_type,
            date: entry.date,
            user_input: Some(user_input),
            items: self.items,
            source: EntrySource::AiVision,
        }
    }
}

/// Estimated workout from a description or photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutEstimate {
    /// Summary of the session
    pub description: String,
    /// Exercise names
    #[serde(default)]
    pub exercises: Vec<String>,
    /// Estimated kilocalories burned
    pub estimated_calories_burned: u32,
    /// Provenance
    #[serde(default)]
    pub origin: EstimateOrigin,
}

impl WorkoutEstimate {
    /// Build a workout entry dated `date`
    #[must_use]
    pub fn into_wod_entry(self, date: NaiveDate, source: EntrySource) -> WodEntry {
        WodEntry {
            id: Uuid::new_v4(),
            date,
            description: self.description,
            exercises: self.exercises,
            estimated_calories_burned: self.estimated_calories_burned,
            source,
        }
    }
}

/// Result of the classify-then-estimate image call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageEstimate {
    /// Photo shows food
    Food(NutritionEstimate),
    /// Photo shows a workout board or exercise
    Workout(WorkoutEstimate),
}

/// Illustration category attached to a suggestion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    /// Eggs
    Eggs,
    /// Chicken
    Chicken,
    /// Fish
    Fish,
    /// Salad
    Salad,
    /// Smoothie or shake
    Smoothie,
    /// Yogurt
    Yogurt,
    /// Quinoa
    Quinoa,
    /// Oats
    Oats,
    /// Soup
    Soup,
    /// Pasta
    Pasta,
    /// Beef
    Beef,
    /// Turkey
    Turkey,
    /// Anything else
    #[default]
    Generic,
}

impl SuggestionCategory {
    /// All categories, in prompt order
    pub const ALL: [Self; 13] = [
        Self::Eggs,
        Self::Chicken,
        Self::Fish,
        Self::Salad,
        Self::Smoothie,
        Self::Yogurt,
        Self::Quinoa,
        Self::Oats,
        Self::Soup,
        Self::Pasta,
        Self::Beef,
        Self::Turkey,
        Self::Generic,
    ];

    /// Parse a category name, mapping unknown names to `Generic`
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .unwrap_or_default()
    }

    /// Serialized identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eggs => "eggs",
            Self::Chicken => "chicken",
            Self::Fish => "fish",
            Self::Salad => "salad",
            Self::Smoothie => "smoothie",
            Self::Yogurt => "yogurt",
            Self::Quinoa => "quinoa",
            Self::Oats => "oats",
            Self::Soup => "soup",
            Self::Pasta => "pasta",
            Self::Beef => "beef",
            Self::Turkey => "turkey",
            Self::Generic => "generic",
        }
    }
}

/// One suggested meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealSuggestion {
    /// Short title
    pub label: String,
    /// One-line description
    pub description: String,
    /// Kilocalories
    pub calories: u32,
    /// Protein grams
    pub protein_g: u32,
    /// Carbohydrate grams
    pub carbs_g: u32,
    /// Fat grams
    pub fat_g: u32,
    /// Illustration category
    #[serde(default)]
    pub image_category: SuggestionCategory,
    /// Ingredient list
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Preparation steps
    #[serde(default)]
    pub recipe: Vec<String>,
}

impl MealSuggestion {
    /// Nutritional values of the suggestion
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
