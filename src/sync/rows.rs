// ABOUTME: Serde row shapes for the profiles, meals, water_logs and wods tables
// ABOUTME: Conversions between stored rows and the ledger's domain records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use chrono::NaiveDate;
use pritness_core::intelligence::{BiometricInput, Goal, NutritionTargets, Sex};
use pritness_core::models::{
    EntrySource, MealEntry, MealItem, MealType, Profile, ProfileDraft, WaterLog, WodEntry,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time zone stored for rows that predate the column
const DEFAULT_TIMEZONE: &str = "UTC";

/// `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRow {
    /// Profile id
    pub id: Uuid,
    /// Identity provider subject
    pub auth_id: String,
    /// Display name
    pub name: String,
    /// Kilograms
    pub weight: f64,
    /// Centimetres
    pub height: f64,
    /// Years
    pub age: u32,
    /// Goal; legacy values are accepted
    pub goal: Goal,
    /// `male` / `female`; older rows may be null
    pub sex: Option<String>,
    /// Basal metabolic rate
    pub tmb: f64,
    /// Calorie target
    pub daily_calories_target: u32,
    /// Protein grams
    pub protein_target: u32,
    /// Carbohydrate grams
    pub carbs_target: u32,
    /// Fat grams
    pub fat_target: u32,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
    /// IANA time zone
    #[serde(default)]
    pub timezone: Option<String>,
}

impl From<&Profile> for ProfileRow {
    fn from(profile: &Profile) -> Self {
        let bio = profile.biometrics();
        let targets = profile.targets();
        Self {
            id: profile.id(),
            auth_id: profile.auth_id().to_owned(),
            name: profile.name().to_owned(),
            weight: bio.weight_kg,
            height: bio.height_cm,
            age: bio.age,
            goal: profile.goal(),
            sex: Some(bio.sex.as_str().to_owned()),
            tmb: targets.basal_metabolic_rate,
            daily_calories_target: targets.daily_calories_target,
            protein_target: targets.protein_target_g,
            carbs_target: targets.carbs_target_g,
            fat_target: targets.fat_target_g,
            country: profile.country().map(str::to_owned),
            timezone: Some(profile.timezone_name().to_owned()),
        }
    }
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        let draft = ProfileDraft {
            name: row.name,
            biometrics: BiometricInput {
                weight_kg: row.weight,
                height_cm: row.height,
                age: row.age,
                sex: Sex::from_str_lossy(row.sex.as_deref()),
            },
            goal: row.goal,
            country: row.country,
            timezone: row
                .timezone
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_owned()),
        };
        let targets = NutritionTargets {
            basal_metabolic_rate: row.tmb,
            daily_calories_target: row.daily_calories_target,
            protein_target_g: row.protein_target,
            carbs_target_g: row.carbs_target,
            fat_target_g: row.fat_target,
        };
        Self::from_stored(row.id, row.auth_id, draft, targets)
    }
}

/// `meals` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealRow {
    /// Entry id
    pub id: Uuid,
    /// Owning profile
    pub user_id: Uuid,
    /// Ledger date
    pub date: NaiveDate,
    /// Meal slot
    pub meal_type: MealType,
    /// Description
    pub name: String,
    /// Kilocalories
    pub calories: u32,
    /// Protein grams
    pub protein: u32,
    /// Carbohydrate grams
    #[serde(default)]
    pub carbs: u32,
    /// Fat grams
    #[serde(default)]
    pub fat: u32,
    /// Provenance
    #[serde(default)]
    pub source: EntrySource,
    /// Original user text
    #[serde(default)]
    pub user_input: Option<String>,
    /// Sub-items, stored as JSON
    #[serde(default)]
    pub items: Option<Vec<MealItem>>,
}

impl MealRow {
    /// Row for `meal` owned by `profile_id`
    #[must_use]
    pub fn from_entry(profile_id: Uuid, meal: &MealEntry) -> Self {
        Self {
            id: meal.id,
            user_id: profile_id,
            date: meal.date,
            meal_type: meal.meal_type,
            name: meal.name.clone(),
            calories: meal.calories,
            protein: meal.protein_g,
            carbs: meal.carbs_g,
            fat: meal.fat_g,
            source: meal.source,
            user_input: meal.user_input.clone(),
            items: (!meal.items.is_empty()).then(|| meal.items.clone()),
        }
    }
}

impl From<MealRow> for MealEntry {
    fn from(row: MealRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            calories: row.calories,
            protein_g: row.protein,
            carbs_g: row.carbs,
            fat_g: row.fat,
            meal_type: row.meal_type,
            date: row.date,
            user_input: row.user_input,
            items: row.items.unwrap_or_default(),
            source: row.source,
        }
    }
}

/// `water_logs` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaterLogRow {
    /// Entry id
    pub id: Uuid,
    /// Owning profile
    pub user_id: Uuid,
    /// Ledger date
    pub date: NaiveDate,
    /// Millilitres
    pub amount_ml: u32,
}

impl WaterLogRow {
    /// Row for `log` owned by `profile_id`
    #[must_use]
    pub const fn from_log(profile_id: Uuid, log: &WaterLog) -> Self {
        Self {
            id: log.id,
            user_id: profile_id,
            date: log.date,
            amount_ml: log.amount_ml,
        }
    }
}

/// `wods` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WodRow {
    /// Entry id
    pub id: Uuid,
    /// Owning profile
    pub user_id: Uuid,
    /// Session date
    pub date: NaiveDate,
    /// Description
    pub description: String,
    /// Exercise names
    #[serde(default)]
    pub exercises: Vec<String>,
    /// Estimated kilocalories burned
    pub calories_burned: u32,
    /// Provenance
    #[serde(default)]
    pub source: EntrySource,
}

impl WodRow {
    /// Row for `wod` owned by `profile_id`
    #[must_use]
    pub fn from_entry(profile_id: Uuid, wod: &WodEntry) -> Self {
        Self {
            id: wod.id,
            user_id: profile_id,
            date: wod.date,
            description: wod.description.clone(),
            exercises: wod.exercises.clone(),
            calories_burned: wod.estimated_calories_burned,
            source: wod.source,
        }
    }
}

impl From<WodRow> for WodEntry {
    fn from(row: WodRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            description: row.description,
            exercises: row.exercises,
            estimated_calories_burned: row.calories_burned,
            source: row.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_profile_row() {
        let row: ProfileRow = serde_json::from_value(json!({
            "id": "8b0c3c52-7f3e-4c7a-9d59-2f3a1d1e0b11",
            "auth_id": "auth-1",
            "name": "Luis",
            "weight": 70,
            "height": 175,
            "age": 25,
            "goal": "definir_masa",
            "sex": null,
            "tmb": 1673.75,
            "daily_calories_target": 1674,
            "protein_target": 105,
            "carbs_target": 209,
            "fat_target": 47
        }))
        .unwrap();
        let profile = Profile::from(row);

        assert_eq!(profile.goal(), Goal::DefineMuscle);
        assert_eq!(profile.biometrics().sex, Sex::Female);
        assert_eq!(profile.timezone_name(), "UTC");
        assert_eq!(profile.targets().daily_calories_target, 1674);
    }

    #[test]
    fn test_meal_row_defaults_missing_macros() {
        let row: MealRow = serde_json::from_value(json!({
            "id": "5d6f2c1a-1111-4a4a-8b8b-0c0c0c0c0c0c",
            "user_id": "8b0c3c52-7f3e-4c7a-9d59-2f3a1d1e0b11",
            "date": "2025-03-10",
            "meal_type": "lunch",
            "name": "Rice bowl",
            "calories": 640,
            "protein": 32
        }))
        .unwrap();
        let entry = MealEntry::from(row);

        assert_eq!(entry.carbs_g, 0);
        assert_eq!(entry.source, EntrySource::Manual);
        assert!(entry.items.is_empty());
    }
}
