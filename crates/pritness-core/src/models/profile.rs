// ABOUTME: User profile with biometrics, goal and the derived target set
// ABOUTME: Targets are only ever recomputed together through the goal engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppResult;
use crate::intelligence::{derive_targets, BiometricInput, Goal, NutritionTargets};

/// Everything the user supplies at registration or on edit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileDraft {
    /// Display name
    pub name: String,
    /// Weight, height, age and sex
    pub biometrics: BiometricInput,
    /// Goal selection
    pub goal: Goal,
    /// Country, used to localize suggestions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// IANA time zone name
    pub timezone: String,
}

/// A user's biometric and goal configuration plus derived targets
///
/// There is no setter for individual targets; [`Profile::apply_edit`] replaces
/// the inputs wholesale and recomputes the full set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    id: Uuid,
    auth_id: String,
    name: String,
    biometrics: BiometricInput,
    goal: Goal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    timezone: String,
    targets: NutritionTargets,
}

impl Profile {
    /// Create a profile at registration
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricInput` when the draft fails validation.
    pub fn new(id: Uuid, auth_id: impl Into<String>, draft: ProfileDraft) -> AppResult<Self> {
        let targets = derive_targets(&draft.biometrics, draft.goal)?;
        Ok(Self {
            id,
            auth_id: auth_id.into(),
            name: draft.name,
            biometrics: draft.biometrics,
            goal: draft.goal,
            country: draft.country,
            timezone: draft.timezone,
            targets,
        })
    }

    /// Rehydrate a stored profile, trusting the persisted target set
    #[must_use]
    pub fn from_stored(
        id: Uuid,
        auth_id: impl Into<String>,
        draft: ProfileDraft,
        targets: NutritionTargets,
    ) -> Self {
        Self {
            id,
            auth_id: auth_id.into(),
            name: draft.name,
            biometrics: draft.biometrics,
            goal: draft.goal,
            country: draft.country,
            timezone: draft.timezone,
            targets,
        }
    }

    /// Replace every editable field and recompute all targets
    ///
    /// The profile is left untouched when validation fails.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricInput` when the draft fails validation.
    pub fn apply_edit(&mut self, draft: ProfileDraft) -> AppResult<()> {
        let targets = derive_targets(&draft.biometrics, draft.goal)?;
        self.name = draft.name;
        self.biometrics = draft.biometrics;
        self.goal = draft.goal;
        self.country = draft.country;
        self.timezone = draft.timezone;
        self.targets = targets;
        Ok(())
    }

    /// Editable fields as a draft
    #[must_use]
    pub fn draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.name.clone(),
            biometrics: self.biometrics,
            goal: self.goal,
            country: self.country.clone(),
            timezone: self.timezone.clone(),
        }
    }

    /// Profile id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Identity provider subject owning this profile
    #[must_use]
    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Biometric inputs
    #[must_use]
    pub const fn biometrics(&self) -> &BiometricInput {
        &self.biometrics
    }

    /// Goal
    #[must_use]
    pub const fn goal(&self) -> Goal {
        self.goal
    }

    /// Country, if set
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Stored time zone name
    #[must_use]
    pub fn timezone_name(&self) -> &str {
        &self.timezone
    }

    /// Parsed time zone, UTC when the stored name is unknown
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    /// Derived target set
    #[must_use]
    pub const fn targets(&self) -> &NutritionTargets {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::intelligence::Sex;

    fn draft(weight_kg: f64, goal: Goal) -> ProfileDraft {
        ProfileDraft {
            name: "Ana".to_owned(),
            biometrics: BiometricInput {
                weight_kg,
                height_cm: 165.0,
                age: 30,
                sex: Sex::Female,
            },
            goal,
            country: Some("Chile".to_owned()),
            timezone: "America/Santiago".to_owned(),
        }
    }

    #[test]
    fn test_edit_recomputes_all_targets() {
        let mut profile = Profile::new(Uuid::new_v4(), "auth", draft(60.0, Goal::LoseWeight)).unwrap();
        let before = *profile.targets();
        profile.apply_edit(draft(60.0, Goal::GainMuscle)).unwrap();
        let after = *profile.targets();

        assert!((before.basal_metabolic_rate - after.basal_metabolic_rate).abs() < f64::EPSILON);
        assert!(after.daily_calories_target > before.daily_calories_target);
        assert_ne!(before.carbs_target_g, after.carbs_target_g);
    }

    #[test]
    fn test_failed_edit_leaves_profile_untouched() {
        let mut profile = Profile::new(Uuid::new_v4(), "auth", draft(60.0, Goal::LoseWeight)).unwrap();
        let snapshot = profile.clone();
        let error = profile.apply_edit(draft(0.0, Goal::GainMuscle)).unwrap_err();

        assert_eq!(error.code, ErrorCode::InvalidBiometricInput);
        assert_eq!(profile, snapshot);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let mut d = draft(60.0, Goal::DefineMuscle);
        d.timezone = "Mars/Olympus".to_owned();
        let profile = Profile::new(Uuid::new_v4(), "auth", d).unwrap();
        assert_eq!(profile.timezone(), Tz::UTC);
    }
}
