// ABOUTME: Remote sync adapter contract between the daily ledger and the hosted store
// ABOUTME: Upsert-by-id writes, date-scoped reads and the batched day fetch used by sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Remote Sync Adapter
//!
//! The ledger is local-first: it mutates in memory, then hands writes to the
//! [`RemoteWriteQueue`], which applies them through a [`RemoteSyncAdapter`].
//! Reads happen only during `sync_from_db` and profile loads.
//!
//! Contract every backend honours:
//!
//! - `insert_*` are upserts keyed by the entry id; replaying one is harmless
//! - deleting an id that does not exist succeeds
//! - "today" is the date passed in, computed in the profile's time zone
//! - write failures are `RemoteWriteFailed`, read failures `RemoteReadFailed`

/// `HashMap` backed adapter for offline mode and tests
pub mod memory;
/// `PostgREST` adapter for the hosted store
pub mod rest;
/// Row shapes of the remote tables
pub mod rows;
/// Bounded retry queue for remote writes
pub mod write_queue;

pub use memory::InMemorySyncAdapter;
pub use rest::RestSyncAdapter;
pub use write_queue::{FlushReport, RemoteWriteQueue, WriteKey, WriteOp};

use async_trait::async_trait;
use chrono::NaiveDate;
use pritness_core::models::{DailyTotals, MealEntry, MealTotals, Profile, WaterLog, WodEntry};
use tokio::try_join;
use uuid::Uuid;

use crate::errors::AppResult;

/// Everything `sync_from_db` reads for one (profile, date)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteDayBatch {
    /// Aggregated meal values for the date
    pub meal_totals: MealTotals,
    /// Individual meal rows for the date, newest first
    pub meals: Vec<MealEntry>,
    /// Water drunk on the date
    pub water_ml: u32,
    /// Full workout history, newest first
    pub wods: Vec<WodEntry>,
}

impl RemoteDayBatch {
    /// Materialize the aggregate for `date`
    ///
    /// Burned calories come from the workouts dated `date` only.
    #[must_use]
    pub fn daily_totals(&self, date: NaiveDate) -> DailyTotals {
        let burned_kcal = self
            .wods
            .iter()
            .filter(|wod| wod.date == date)
            .fold(0_u32, |acc, wod| {
                acc.saturating_add(wod.estimated_calories_burned)
            });

        let mut totals = DailyTotals {
            burned_kcal,
            water_ml: self.water_ml,
            ..DailyTotals::default()
        };
        totals.add_meal(self.meal_totals);
        totals
    }

    /// Apply writes the store has not accepted yet, oldest first
    ///
    /// Meal and water writes count only for `profile_id` on `date`; workout
    /// writes touch the whole history.
    pub fn apply_pending(&mut self, pending: &[WriteOp], profile_id: Uuid, date: NaiveDate) {
        let mut meals_changed = false;
        for op in pending {
            match op {
                WriteOp::UpsertMeal {
                    profile_id: owner,
                    meal,
                } if *owner == profile_id => {
                    self.meals.retain(|m| m.id != meal.id);
                    if meal.date == date {
                        self.meals.insert(0, meal.clone());
                    }
                    meals_changed = true;
                }
                WriteOp::DeleteMeal { id } => {
                    let before = self.meals.len();
                    self.meals.retain(|m| m.id != *id);
                    meals_changed |= self.meals.len() != before;
                }
                WriteOp::InsertWater {
                    profile_id: owner,
                    log,
                } if *owner == profile_id && log.date == date => {
                    self.water_ml = self.water_ml.saturating_add(log.amount_ml);
                }
                WriteOp::UpsertWod {
                    profile_id: owner,
                    wod,
                } if *owner == profile_id => {
                    self.wods.retain(|w| w.id != wod.id);
                    self.wods.insert(0, wod.clone());
                }
                WriteOp::DeleteWod { id } => self.wods.retain(|w| w.id != *id),
                WriteOp::UpsertMeal { .. }
                | WriteOp::InsertWater { .. }
                | WriteOp::UpsertWod { .. }
                | WriteOp::SaveProfile { .. } => {}
            }
        }
        if meals_changed {
            self.meal_totals = MealTotals::sum(&self.meals);
        }
    }
}

/// Persistence boundary for profiles and ledger entries
#[async_trait]
pub trait RemoteSyncAdapter: Send + Sync {
    /// Backend identifier for logs
    fn name(&self) -> &'static str;

    /// Upsert a meal row
    async fn insert_meal(&self, profile_id: Uuid, meal: &MealEntry) -> AppResult<()>;

    /// Upsert a water log row
    async fn insert_water_log(&self, profile_id: Uuid, log: &WaterLog) -> AppResult<()>;

    /// Upsert a workout row
    async fn insert_wod(&self, profile_id: Uuid, wod: &WodEntry) -> AppResult<()>;

    /// Delete a meal row
    async fn delete_meal(&self, id: Uuid) -> AppResult<()>;

    /// Delete a workout row
    async fn delete_wod(&self, id: Uuid) -> AppResult<()>;

    /// Sum of meal values for `date`
    async fn fetch_today_meal_totals(&self, profile_id: Uuid, date: NaiveDate)
        -> AppResult<MealTotals>;

    /// Meal rows for `date`, newest first
    async fn fetch_today_meals(&self, profile_id: Uuid, date: NaiveDate)
        -> AppResult<Vec<MealEntry>>;

    /// Water millilitres logged on `date`
    async fn fetch_today_water_ml(&self, profile_id: Uuid, date: NaiveDate) -> AppResult<u32>;

    /// Every workout of the profile, newest first
    async fn fetch_all_wods(&self, profile_id: Uuid) -> AppResult<Vec<WodEntry>>;

    /// Profile owned by an identity, if one was registered
    async fn fetch_profile(&self, auth_id: &str) -> AppResult<Option<Profile>>;

    /// Insert or replace a profile
    async fn save_profile(&self, profile: &Profile) -> AppResult<()>;

    /// One sync fetch batch: the four reads run concurrently
    async fn fetch_day(&self, profile_id: Uuid, date: NaiveDate) -> AppResult<RemoteDayBatch> {
        let (meal_totals, meals, water_ml, wods) = try_join!(
            self.fetch_today_meal_totals(profile_id, date),
            self.fetch_today_meals(profile_id, date),
            self.fetch_today_water_ml(profile_id, date),
            self.fetch_all_wods(profile_id),
        )?;
        Ok(RemoteDayBatch {
            meal_totals,
            meals,
            water_ml,
            wods,
        })
    }

    /// Aggregate for (profile, date), the shape scheduled reminders read
    async fn fetch_daily_totals(&self, profile_id: Uuid, date: NaiveDate) -> AppResult<DailyTotals> {
        Ok(self.fetch_day(profile_id, date).await?.daily_totals(date))
    }
}
