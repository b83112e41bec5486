// ABOUTME: Append-only body weight series with BMI and trend helpers
// ABOUTME: WeightHistory and BmiCategory classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use chrono::{DateTime, Utc};
use pritness_core::constants::{biometrics, bmi};
use pritness_core::errors::{AppError, AppResult};
use pritness_core::models::WeightLogEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// BMI classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    /// Below 18.5
    Underweight,
    /// 18.5 to below 25
    Normal,
    /// 25 to below 30
    Overweight,
    /// 30 and above
    Obese,
}

impl BmiCategory {
    /// Classify a BMI value
    #[must_use]
    pub fn from_bmi(value: f64) -> Self {
        if value < bmi::UNDERWEIGHT_BELOW {
            Self::Underweight
        } else if value < bmi::NORMAL_BELOW {
            Self::Normal
        } else if value < bmi::OVERWEIGHT_BELOW {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

/// Body mass index for `weight_kg` at `height_cm`
#[must_use]
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let metres = height_cm / 100.0;
    Some(weight_kg / (metres * metres))
}

/// Chronological weight measurements; entries are never edited or removed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeightHistory {
    entries: Vec<WeightLogEntry>,
}

impl WeightHistory {
    /// Wrap existing entries, sorting them by time
    #[must_use]
    pub fn from_entries(mut entries: Vec<WeightLogEntry>) -> Self {
        entries.sort_by_key(|entry| entry.recorded_at);
        Self { entries }
    }

    /// Append a measurement
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricInput` for weights outside (0, 300] kg.
    pub fn record(&mut self, weight_kg: f64, recorded_at: DateTime<Utc>) -> AppResult<WeightLogEntry> {
        if !weight_kg.is_finite()
            || weight_kg <= 0.0
            || weight_kg > biometrics::MAX_WEIGHT_KG
        {
            return Err(AppError::invalid_biometric(
                "weight_kg",
                format!(
                    "weight must be greater than 0 and at most {} kg",
                    biometrics::MAX_WEIGHT_KG
                ),
            ));
        }
        let entry = WeightLogEntry {
            id: Uuid::new_v4(),
            recorded_at,
            weight_kg,
        };
        let position = self
            .entries
            .partition_point(|existing| existing.recorded_at <= recorded_at);
        self.entries.insert(position, entry);
        Ok(entry)
    }

    /// All entries, oldest first
    #[must_use]
    pub fn entries(&self) -> &[WeightLogEntry] {
        &self.entries
    }

    /// Most recent measurement
    #[must_use]
    pub fn latest(&self) -> Option<&WeightLogEntry> {
        self.entries.last()
    }

    /// First measurement
    #[must_use]
    pub fn starting(&self) -> Option<&WeightLogEntry> {
        self.entries.first()
    }

    /// Latest minus starting weight
    #[must_use]
    pub fn change_kg(&self) -> Option<f64> {
        match (self.starting(), self.latest()) {
            (Some(first), Some(last)) if self.entries.len() > 1 => {
                Some(last.weight_kg - first.weight_kg)
            }
            _ => None,
        }
    }

    /// BMI of the latest measurement
    #[must_use]
    pub fn bmi(&self, height_cm: f64) -> Option<(f64, BmiCategory)> {
        let latest = self.latest()?;
        body_mass_index(latest.weight_kg, height_cm).map(|value| (value, BmiCategory::from_bmi(value)))
    }
}
