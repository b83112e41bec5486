// ABOUTME: Daily ledger owning today's totals, meal list and workout history for one profile
// ABOUTME: Synchronous optimistic mutations, explicit date rollover and sync-once rehydration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Daily Ledger
//!
//! The ledger is the only writer of [`DailyTotals`] and the entry lists.
//! Every mutation:
//!
//! 1. rolls the day over when the profile-local date changed
//! 2. updates the in-memory aggregate (saturating at zero)
//! 3. enqueues the matching remote write, which never rolls back local state
//!
//! Mutations take `&mut self` and never await. `sync_from_db` is the only
//! async operation and runs at most once per (profile, date) unless
//! [`DailyLedger::invalidate_sync`] is called.

mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use std::sync::Arc;

use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use pritness_core::intelligence::NutritionTargets;
use pritness_core::models::{
    DailySummary, DailyTotals, EntrySource, MealEntry, MealTotals, MealType, NutritionEstimate,
    Profile, WaterLog, WodEntry,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::sync::{RemoteWriteQueue, WriteOp};

/// Lifecycle of the current day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    /// Nothing logged yet
    Empty,
    /// At least one log of any kind
    Active,
}

/// Result of a `sync_from_db` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Remote state replaced the in-memory day
    Synced,
    /// Already synced for this (profile, date)
    Skipped,
}

/// Local cache of one ledger day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    /// Owning profile
    pub profile_id: Uuid,
    /// Day the snapshot belongs to
    pub date: NaiveDate,
    /// Aggregate
    pub totals: DailyTotals,
    /// Meals of the day, newest first
    pub meals: Vec<MealEntry>,
    /// Workout history, newest first
    pub wods: Vec<WodEntry>,
}

/// Per-profile daily aggregate and entry lists
pub struct DailyLedger {
    clock: Arc<dyn Clock>,
    writes: Arc<RemoteWriteQueue>,
    config: LedgerConfig,
    profile_id: Option<Uuid>,
    timezone: Tz,
    date: NaiveDate,
    totals: DailyTotals,
    meals: Vec<MealEntry>,
    wods: Vec<WodEntry>,
    last_synced: Option<(Uuid, NaiveDate)>,
}

impl DailyLedger {
    /// Empty ledger dated today in UTC until a profile is attached
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, writes: Arc<RemoteWriteQueue>, config: LedgerConfig) -> Self {
        let date = clock.now().with_timezone(&Tz::UTC).date_naive();
        Self {
            clock,
            writes,
            config,
            profile_id: None,
            timezone: Tz::UTC,
            date,
            totals: DailyTotals::default(),
            meals: Vec::new(),
            wods: Vec::new(),
            last_synced: None,
        }
    }

    /// Bind the ledger to a profile and its time zone
    ///
    /// Switching to a different profile clears the day and the sync guard.
    /// A time zone change on the same profile rolls the day over when the
    /// local date moves.
    pub fn attach_profile(&mut self, profile_id: Uuid, timezone: Tz) {
        self.timezone = timezone;
        if self.profile_id == Some(profile_id) {
            self.roll_over_if_needed();
            return;
        }
        debug!(profile.id = %profile_id, "Attaching ledger to profile");
        self.profile_id = Some(profile_id);
        self.last_synced = None;
        self.reset_day();
        self.wods.clear();
        self.date = self.current_date();
    }

    /// Profile the ledger belongs to
    #[must_use]
    pub const fn profile_id(&self) -> Option<Uuid> {
        self.profile_id
    }

    /// Today in the profile's time zone
    #[must_use]
    pub fn current_date(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.timezone).date_naive()
    }

    /// Current hour (0-23) in the profile's time zone
    #[must_use]
    pub fn local_hour(&self) -> u32 {
        self.clock.now().with_timezone(&self.timezone).hour()
    }

    /// Date the in-memory day belongs to
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Start a fresh day when the local date moved on
    ///
    /// Returns true when a rollover happened. Workout history is kept.
    pub fn roll_over_if_needed(&mut self) -> bool {
        let today = self.current_date();
        if today == self.date {
            return false;
        }
        let profile = self
            .profile_id
            .map_or_else(|| "unattached".to_owned(), |id| id.to_string());
        AppLogger::log_day_rollover(&profile, &self.date.to_string(), &today.to_string());
        self.date = today;
        self.reset_day();
        true
    }

    fn reset_day(&mut self) {
        self.totals = DailyTotals::default();
        self.meals.clear();
    }

    /// Empty until anything is logged today
    #[must_use]
    pub fn phase(&self) -> DayPhase {
        if self.totals.is_empty() && self.meals.is_empty() && self.wods_today().next().is_none() {
            DayPhase::Empty
        } else {
            DayPhase::Active
        }
    }

    /// Today's aggregate
    #[must_use]
    pub const fn totals(&self) -> &DailyTotals {
        &self.totals
    }

    /// Today's meals, newest first
    #[must_use]
    pub fn meals(&self) -> &[MealEntry] {
        &self.meals
    }

    /// Workout history, newest first
    #[must_use]
    pub fn wods(&self) -> &[WodEntry] {
        &self.wods
    }

    /// Workouts dated today
    pub fn wods_today(&self) -> impl Iterator<Item = &WodEntry> {
        self.wods.iter().filter(move |wod| wod.date == self.date)
    }

    /// Find one of today's meals
    #[must_use]
    pub fn meal(&self, id: Uuid) -> Option<&MealEntry> {
        self.meals.iter().find(|meal| meal.id == id)
    }

    /// Meal type for a meal logged now
    #[must_use]
    pub fn meal_type_now(&self) -> MealType {
        MealType::for_hour(self.local_hour())
    }

    fn enqueue(&self, op: WriteOp) {
        if self.profile_id.is_some() {
            self.writes.enqueue(op);
        } else {
            debug!(operation = op.label(), "No profile attached; write kept local");
        }
    }

    // ========================================================================
    // Meals
    // ========================================================================

    /// Add a meal's values to today's totals without recording an entry
    pub fn add_meal(&mut self, meal: MealTotals) {
        self.roll_over_if_needed();
        self.totals.add_meal(meal);
    }

    /// Prepend `entry` to today's meals and count its values
    ///
    /// The entry is re-dated to the ledger day.
    pub fn add_meal_entry(&mut self, mut entry: MealEntry) -> Uuid {
        self.roll_over_if_needed();
        entry.date = self.date;
        let id = entry.id;
        self.totals.add_meal(entry.totals());
        self.meals.insert(0, entry);
        id
    }

    /// Record a meal locally and queue its durable insert
    #[instrument(skip(self, entry), fields(meal.id = %entry.id))]
    pub fn log_meal(&mut self, entry: MealEntry) -> Uuid {
        let id = self.add_meal_entry(entry);
        if let (Some(profile_id), Some(meal)) = (self.profile_id, self.meal(id)) {
            self.enqueue(WriteOp::UpsertMeal {
                profile_id,
                meal: meal.clone(),
            });
        }
        id
    }

    /// Replace a meal's contents, moving its contribution in one step
    ///
    /// The replacement keeps the original id and date. Returns false when no
    /// meal with `id` is in today's list.
    pub fn update_meal(&mut self, id: Uuid, mut updated: MealEntry) -> bool {
        self.roll_over_if_needed();
        let Some(slot) = self.meals.iter_mut().find(|meal| meal.id == id) else {
            return false;
        };
        updated.id = id;
        updated.date = slot.date;
        self.totals.subtract_meal(slot.totals());
        self.totals.add_meal(updated.totals());
        *slot = updated;

        if let (Some(profile_id), Some(meal)) = (self.profile_id, self.meal(id)) {
            self.enqueue(WriteOp::UpsertMeal {
                profile_id,
                meal: meal.clone(),
            });
        }
        true
    }

    /// Replace a meal's nutrition with a fresh estimate of `user_input`
    ///
    /// Returns the updated entry, or `None` when the meal is not in today's list.
    pub fn reanalyze_meal(
        &mut self,
        id: Uuid,
        estimate: NutritionEstimate,
        user_input: String,
    ) -> Option<&MealEntry> {
        let current = self.meal(id)?;
        let updated = estimate.reanalyzed(current, user_input);
        self.update_meal(id, updated).then(|| self.meal(id)).flatten()
    }

    /// Remove one of today's meals and queue the remote delete
    pub fn remove_meal(&mut self, id: Uuid) -> Option<MealEntry> {
        self.roll_over_if_needed();
        let index = self.meals.iter().position(|meal| meal.id == id)?;
        let removed = self.meals.remove(index);
        self.totals.subtract_meal(removed.totals());
        self.enqueue(WriteOp::DeleteMeal { id });
        Some(removed)
    }

    // ========================================================================
    // Water and workouts
    // ========================================================================

    /// Log water drunk now
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `ml` is zero.
    pub fn add_water(&mut self, ml: u32) -> AppResult<WaterLog> {
        if ml == 0 {
            return Err(AppError::invalid_input("water amount must be positive"));
        }
        self.roll_over_if_needed();
        self.totals.water_ml = self.totals.water_ml.saturating_add(ml);
        let log = WaterLog {
            id: Uuid::new_v4(),
            date: self.date,
            amount_ml: ml,
        };
        if let Some(profile_id) = self.profile_id {
            self.enqueue(WriteOp::InsertWater { profile_id, log });
        }
        Ok(log)
    }

    /// Record a workout; burned calories count when it is dated today
    pub fn add_wod(&mut self, entry: WodEntry) -> Uuid {
        self.roll_over_if_needed();
        if entry.date == self.date {
            self.totals.burned_kcal = self
                .totals
                .burned_kcal
                .saturating_add(entry.estimated_calories_burned);
        }
        let id = entry.id;
        if let Some(profile_id) = self.profile_id {
            self.enqueue(WriteOp::UpsertWod {
                profile_id,
                wod: entry.clone(),
            });
        }
        self.wods.insert(0, entry);
        id
    }

    /// Delete a workout; burned calories drop only for today's sessions
    pub fn remove_wod(&mut self, id: Uuid) -> Option<WodEntry> {
        self.roll_over_if_needed();
        let index = self.wods.iter().position(|wod| wod.id == id)?;
        let removed = self.wods.remove(index);
        if removed.date == self.date {
            self.totals.burned_kcal = self
                .totals
                .burned_kcal
                .saturating_sub(removed.estimated_calories_burned);
        }
        self.enqueue(WriteOp::DeleteWod { id });
        Some(removed)
    }

    // ========================================================================
    // Sync and cache
    // ========================================================================

    /// Replace the day with the remote state, once per (profile, date)
    ///
    /// Writes still waiting in the queue are laid over the fetched rows, so
    /// a failed push never drops a local entry. On failure the in-memory day is left untouched and the next call
    /// tries again.
    ///
    /// # Errors
    ///
    /// Returns `RemoteReadFailed` when any of the reads fails.
    #[instrument(skip(self), fields(profile.id = %profile_id))]
    pub async fn sync_from_db(&mut self, profile_id: Uuid) -> AppResult<SyncOutcome> {
        if self.profile_id != Some(profile_id) {
            self.attach_profile(profile_id, self.timezone);
        }
        self.roll_over_if_needed();
        let date = self.date;
        if self.last_synced == Some((profile_id, date)) {
            debug!(%date, "Ledger already synced; skipping");
            return Ok(SyncOutcome::Skipped);
        }

        let batch = match self.writes.fetch_day_with_pending(profile_id, date).await {
            Ok(batch) => batch,
            Err(error) => {
                warn!(%date, error = %error, "Ledger sync failed; keeping local state");
                return Err(error);
            }
        };

        self.totals = batch.daily_totals(date);
        self.meals = batch.meals;
        self.wods = batch.wods;
        self.last_synced = Some((profile_id, date));
        info!(
            %date,
            meals = self.meals.len(),
            wods = self.wods.len(),
            eaten_kcal = self.totals.eaten_kcal,
            "Ledger rehydrated from remote store"
        );
        Ok(SyncOutcome::Synced)
    }

    /// Force the next `sync_from_db` to fetch again
    pub fn invalidate_sync(&mut self) {
        self.last_synced = None;
    }

    /// True once today's state came from the remote store
    #[must_use]
    pub fn is_authoritative(&self) -> bool {
        match (self.profile_id, self.last_synced) {
            (Some(profile_id), Some(synced)) => synced == (profile_id, self.current_date()),
            _ => false,
        }
    }

    /// Copy of the current day for the local cache
    #[must_use]
    pub fn snapshot(&self) -> Option<LedgerSnapshot> {
        self.profile_id.map(|profile_id| LedgerSnapshot {
            profile_id,
            date: self.date,
            totals: self.totals,
            meals: self.meals.clone(),
            wods: self.wods.clone(),
        })
    }

    /// Load a cached day while the remote sync is pending
    ///
    /// Ignored unless it belongs to the attached profile and today, or when
    /// the ledger is already authoritative.
    pub fn restore_snapshot(&mut self, snapshot: LedgerSnapshot) -> bool {
        self.roll_over_if_needed();
        if self.profile_id != Some(snapshot.profile_id)
            || snapshot.date != self.date
            || self.is_authoritative()
        {
            return false;
        }
        self.totals = snapshot.totals;
        self.meals = snapshot.meals;
        self.wods = snapshot.wods;
        true
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// `max(0, target - eaten + burned)`
    #[must_use]
    pub fn remaining_calories(&self, targets: &NutritionTargets) -> u32 {
        self.totals.remaining_calories(targets)
    }

    /// Protein grams still to eat
    #[must_use]
    pub fn remaining_protein(&self, targets: &NutritionTargets) -> u32 {
        self.totals.remaining_protein(targets)
    }

    /// Totals and targets for today
    #[must_use]
    pub fn summary(&self, profile: &Profile) -> DailySummary {
        let targets = *profile.targets();
        DailySummary {
            profile_id: profile.id(),
            date: self.date,
            totals: self.totals,
            targets,
            water_target_ml: self.config.water_target_ml,
            remaining_calories: self.remaining_calories(&targets),
            remaining_protein_g: self.remaining_protein(&targets),
        }
    }

    /// Build a manual meal entry for today from raw values
    #[must_use]
    pub fn manual_meal(&self, name: impl Into<String>, totals: MealTotals) -> MealEntry {
        let mut entry = MealEntry::new(name, totals, self.meal_type_now(), self.date);
        entry.source = EntrySource::Manual;
        entry
    }
}
