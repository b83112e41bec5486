// ABOUTME: Per-profile tracker session exposing every user-facing operation
// ABOUTME: Ledger mutations, estimation with stale-result discarding, preferences, weight and chat
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Tracker Session
//!
//! Estimation calls take a generation ticket before awaiting the gateway and
//! return `Ok(None)` when a newer request of the same kind superseded them,
//! whether the stale request succeeded or failed.
//! Ledger mutations apply immediately and cache the day locally afterwards;
//! a failing cache write is logged, never surfaced.

use std::sync::Arc;

use pritness_core::constants::tracking::MAX_CHAT_HISTORY;
use pritness_core::intelligence::TargetCrossCheck;
use pritness_core::models::{
    ChatTurn, DailySummary, EntrySource, ImageEstimate, MealEntry, MealSuggestion, MealTotals,
    NutritionEstimate, Profile, ProfileDraft, WaterLog, WeightLogEntry, WodEntry, WorkoutEstimate,
};
use pritness_intelligence::{
    build_recommendation_context, fallback_suggestions, Feedback, FoodPreferences,
    RecommendationContext, WeightHistory,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::tracker::TrackerContext;
use crate::errors::{AppError, AppResult};
use crate::estimation::{EstimationSlot, NutritionEstimationGateway, RequestGenerations};
use crate::ledger::{DailyLedger, SyncOutcome};
use crate::llm::ImageAttachment;
use crate::sync::WriteOp;

/// State and operations for one loaded profile
pub struct TrackerSession {
    context: TrackerContext,
    profile: Profile,
    ledger: DailyLedger,
    preferences: FoodPreferences,
    weights: WeightHistory,
    chat: Vec<ChatTurn>,
    generations: RequestGenerations,
}

impl TrackerSession {
    pub(super) fn new(
        context: TrackerContext,
        profile: Profile,
        ledger: DailyLedger,
        preferences: FoodPreferences,
        weights: WeightHistory,
    ) -> Self {
        Self {
            context,
            profile,
            ledger,
            preferences,
            weights,
            chat: Vec::new(),
            generations: RequestGenerations::new(),
        }
    }

    /// Loaded profile
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Today's ledger
    #[must_use]
    pub const fn ledger(&self) -> &DailyLedger {
        &self.ledger
    }

    /// Food preferences
    #[must_use]
    pub const fn preferences(&self) -> &FoodPreferences {
        &self.preferences
    }

    /// Weight history
    #[must_use]
    pub const fn weights(&self) -> &WeightHistory {
        &self.weights
    }

    /// Assistant conversation, oldest first
    #[must_use]
    pub fn chat_history(&self) -> &[ChatTurn] {
        &self.chat
    }

    fn gateway(&self) -> &Arc<dyn NutritionEstimationGateway> {
        self.context.gateway()
    }

    async fn cache_day(&self) {
        let Some(snapshot) = self.ledger.snapshot() else {
            return;
        };
        if let Err(error) = self.context.store().save_snapshot(&snapshot).await {
            warn!(error = %error, "Failed to cache ledger day");
        }
    }

    // ========================================================================
    // Profile
    // ========================================================================

    /// Replace biometrics and goal, recomputing every target together
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricInput` and leaves the profile untouched when
    /// the draft is out of range.
    pub fn edit_profile(&mut self, draft: ProfileDraft) -> AppResult<&Profile> {
        self.profile.apply_edit(draft)?;
        self.ledger
            .attach_profile(self.profile.id(), self.profile.timezone());
        self.context.writes().enqueue(WriteOp::SaveProfile {
            profile: Box::new(self.profile.clone()),
        });
        info!(profile.id = %self.profile.id(), "Profile updated");
        Ok(&self.profile)
    }

    /// Ask the estimator for this profile's targets and set them beside the local ones
    ///
    /// Returns `Ok(None)` when a newer cross-check superseded this one.
    ///
    /// # Errors
    ///
    /// Returns `EstimatorNotConfigured` without a provider, or the gateway error.
    pub async fn cross_check_targets(&self) -> AppResult<Option<TargetCrossCheck>> {
        let ticket = self.generations.begin(EstimationSlot::Targets);
        let result = self
            .gateway()
            .recommend_targets(self.profile.biometrics(), self.profile.goal())
            .await;
        let Some(estimated) = self.generations.settle(ticket, result)? else {
            return Ok(None);
        };
        let check = TargetCrossCheck {
            computed: *self.profile.targets(),
            estimated,
        };
        if check.agrees() {
            info!(calorie_delta = check.calorie_delta(), "Target cross-check agrees");
        } else {
            warn!(
                calorie_delta = check.calorie_delta(),
                macro_delta_g = check.max_macro_delta_g(),
                "Estimated targets disagree with the goal engine"
            );
        }
        Ok(Some(check))
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Push pending writes, then rehydrate today's ledger once
    ///
    /// # Errors
    ///
    /// Returns `RemoteReadFailed` when the remote day cannot be fetched.
    #[instrument(skip(self), fields(profile.id = %self.profile.id()))]
    pub async fn sync(&mut self) -> AppResult<SyncOutcome> {
        let report = self.context.writes().flush().await;
        if report.requeued > 0 {
            warn!(
                requeued = report.requeued,
                "Some writes are still pending; they stay in the local day"
            );
        }
        let outcome = self.ledger.sync_from_db(self.profile.id()).await?;
        if outcome == SyncOutcome::Synced {
            self.cache_day().await;
        }
        Ok(outcome)
    }

    /// Force a fresh sync (pull to refresh)
    ///
    /// # Errors
    ///
    /// Returns `RemoteReadFailed` when the remote day cannot be fetched.
    pub async fn refresh(&mut self) -> AppResult<SyncOutcome> {
        self.ledger.invalidate_sync();
        self.sync().await
    }

    // ========================================================================
    // Meals
    // ========================================================================

    /// Estimate a typed meal description
    ///
    /// # Errors
    ///
    /// Returns the gateway error when every provider failed.
    pub async fn analyze_meal_text(&self, description: &str) -> AppResult<Option<NutritionEstimate>> {
        let ticket = self.generations.begin(EstimationSlot::MealText);
        let result = self.gateway().estimate_from_text(description).await;
        self.generations.settle(ticket, result)
    }

    /// Classify and estimate a photo
    ///
    /// # Errors
    ///
    /// Returns `EstimatorNotConfigured` without a vision provider, or the
    /// gateway error when every provider failed.
    pub async fn analyze_image(&self, bytes: &[u8], mime_type: &str) -> AppResult<Option<ImageEstimate>> {
        let ticket = self.generations.begin(EstimationSlot::Image);
        let image = ImageAttachment::from_bytes(bytes, mime_type);
        let result = self.gateway().estimate_from_image(&image).await;
        self.generations.settle(ticket, result)
    }

    /// Log an accepted estimate as a meal of the current time slot
    pub async fn log_estimated_meal(
        &mut self,
        estimate: NutritionEstimate,
        user_input: Option<String>,
        source: EntrySource,
    ) -> Uuid {
        let entry = estimate.into_meal_entry(
            self.ledger.meal_type_now(),
            self.ledger.date(),
            user_input,
            source,
        );
        let id = self.ledger.log_meal(entry);
        self.cache_day().await;
        id
    }

    /// Log a meal typed in by hand
    pub async fn log_manual_meal(&mut self, name: &str, totals: MealTotals) -> Uuid {
        let entry = self.ledger.manual_meal(name, totals);
        let id = self.ledger.log_meal(entry);
        self.cache_day().await;
        id
    }

    /// Re-estimate a logged meal from corrected text, keeping its id and slot
    ///
    /// Returns `Ok(None)` when a newer re-analysis superseded this one.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the meal is not in today's list, or
    /// the gateway error.
    pub async fn reanalyze_meal(&mut self, id: Uuid, user_input: &str) -> AppResult<Option<MealEntry>> {
        if self.ledger.meal(id).is_none() {
            return Err(AppError::not_found(format!("meal {id}")));
        }
        let ticket = self.generations.begin(EstimationSlot::MealText);
        let result = self.gateway().estimate_from_text(user_input).await;
        let Some(estimate) = self.generations.settle(ticket, result)? else {
            return Ok(None);
        };
        let updated = self
            .ledger
            .reanalyze_meal(id, estimate, user_input.to_owned())
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("meal {id}")))?;
        self.cache_day().await;
        Ok(Some(updated))
    }

    /// Remove a meal from today's list
    pub async fn remove_meal(&mut self, id: Uuid) -> Option<MealEntry> {
        let removed = self.ledger.remove_meal(id);
        if removed.is_some() {
            self.cache_day().await;
        }
        removed
    }

    // ========================================================================
    // Water, workouts, weight
    // ========================================================================

    /// Log water
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `ml` is zero.
    pub async fn add_water(&mut self, ml: u32) -> AppResult<WaterLog> {
        let log = self.ledger.add_water(ml)?;
        self.cache_day().await;
        Ok(log)
    }

    /// Body weight used for workout estimates
    #[must_use]
    pub fn current_weight_kg(&self) -> f64 {
        self.weights
            .latest()
            .map_or(self.profile.biometrics().weight_kg, |entry| entry.weight_kg)
    }

    /// Estimate a described workout at the current body weight
    ///
    /// # Errors
    ///
    /// Returns the gateway error when every provider failed.
    pub async fn estimate_workout(&self, description: &str) -> AppResult<Option<WorkoutEstimate>> {
        let ticket = self.generations.begin(EstimationSlot::Workout);
        let result = self
            .gateway()
            .estimate_workout_from_text(description, Some(self.current_weight_kg()))
            .await;
        self.generations.settle(ticket, result)
    }

    /// Log an accepted workout estimate for today
    pub async fn log_workout(&mut self, estimate: WorkoutEstimate, source: EntrySource) -> Uuid {
        let entry = estimate.into_wod_entry(self.ledger.date(), source);
        let id = self.ledger.add_wod(entry);
        self.cache_day().await;
        id
    }

    /// Delete a workout
    pub async fn remove_workout(&mut self, id: Uuid) -> Option<WodEntry> {
        let removed = self.ledger.remove_wod(id);
        if removed.is_some() {
            self.cache_day().await;
        }
        removed
    }

    /// Record a body weight measurement taken now
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricInput` for out-of-range weights or
    /// `StorageError` when the history cannot be saved.
    pub async fn log_weight(&mut self, weight_kg: f64) -> AppResult<WeightLogEntry> {
        let entry = self.weights.record(weight_kg, self.context.clock().now())?;
        self.context
            .store()
            .save_weights(self.profile.id(), &self.weights)
            .await?;
        Ok(entry)
    }

    // ========================================================================
    // Recommendations and chat
    // ========================================================================

    /// Inputs for meal suggestions at the current local hour
    #[must_use]
    pub fn recommendation_context(&self) -> RecommendationContext {
        build_recommendation_context(
            &self.profile,
            self.ledger.totals(),
            self.ledger.local_hour(),
            &self.chat,
            &self.preferences.disliked_foods(),
        )
    }

    /// AI meal suggestions, or the static menu when the AI path yields nothing
    ///
    /// Returns `None` when a newer suggestion request superseded this one.
    pub async fn suggest_meals(&self) -> Option<Vec<MealSuggestion>> {
        let context = self.recommendation_context();
        let ticket = self.generations.begin(EstimationSlot::Suggestions);
        let suggestions = match self.gateway().suggest_meals(&context).await {
            Ok(suggestions) if !suggestions.is_empty() => suggestions,
            Ok(_) => fallback_suggestions(
                context.remaining_calories,
                context.remaining_protein_g,
                context.hour,
            ),
            Err(error) => {
                warn!(error = %error, "Meal suggestions failed, using static menu");
                fallback_suggestions(
                    context.remaining_calories,
                    context.remaining_protein_g,
                    context.hour,
                )
            }
        };
        self.generations.accept(ticket, suggestions)
    }

    /// Like or dislike a suggested food
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the preferences cannot be saved.
    pub async fn rate_food(&mut self, label: &str, feedback: Feedback) -> AppResult<()> {
        self.preferences.record(label, feedback);
        self.context
            .store()
            .save_preferences(self.profile.id(), &self.preferences)
            .await
    }

    /// Ask the assistant; both turns are kept only when a reply arrives
    ///
    /// # Errors
    ///
    /// Returns the gateway error when every provider failed.
    pub async fn send_chat(&mut self, message: &str) -> AppResult<Option<String>> {
        let ticket = self.generations.begin(EstimationSlot::Chat);
        let result = self.gateway().chat(&self.chat, message).await;
        let Some(reply) = self.generations.settle(ticket, result)? else {
            return Ok(None);
        };
        self.chat.push(ChatTurn::user(message));
        self.chat.push(ChatTurn::assistant(reply.as_str()));
        let excess = self.chat.len().saturating_sub(MAX_CHAT_HISTORY);
        self.chat.drain(..excess);
        Ok(Some(reply))
    }

    // ========================================================================
    // Read model
    // ========================================================================

    /// Totals and targets for today
    #[must_use]
    pub fn summary(&self) -> DailySummary {
        self.ledger.summary(&self.profile)
    }
}
