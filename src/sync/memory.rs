// ABOUTME: In-memory remote sync adapter used offline and in tests
// ABOUTME: Tracks fetch batches and can inject write or read failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use pritness_core::models::{MealEntry, MealTotals, Profile, WaterLog, WodEntry};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::RemoteSyncAdapter;
use crate::errors::{AppError, AppResult};

#[derive(Default)]
struct Store {
    profiles: HashMap<String, Profile>,
    meals: HashMap<Uuid, (Uuid, MealEntry)>,
    water: HashMap<Uuid, (Uuid, WaterLog)>,
    wods: HashMap<Uuid, (Uuid, WodEntry)>,
}

#[derive(Default)]
struct Faults {
    failing_writes: AtomicU32,
    offline: AtomicBool,
}

/// `HashMap` backed store shared between clones
///
/// Clones see the same data, so a test can hand one clone to the write
/// queue and inspect another.
#[derive(Clone, Default)]
pub struct InMemorySyncAdapter {
    store: Arc<RwLock<Store>>,
    faults: Arc<Faults>,
    meal_fetches: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySyncAdapter {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` write calls with `RemoteWriteFailed`
    pub fn fail_next_writes(&self, count: u32) {
        self.faults.failing_writes.store(count, Ordering::SeqCst);
    }

    /// While offline every call fails
    pub fn set_offline(&self, offline: bool) {
        self.faults.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `fetch_today_meals` calls, one per sync batch
    #[must_use]
    pub fn meal_fetches(&self) -> usize {
        self.meal_fetches.load(Ordering::SeqCst)
    }

    /// Number of writes that reached the store
    #[must_use]
    pub fn applied_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stored meals of a profile, any date
    pub async fn meals_of(&self, profile_id: Uuid) -> Vec<MealEntry> {
        let store = self.store.read().await;
        let mut meals: Vec<MealEntry> = store
            .meals
            .values()
            .filter(|(owner, _)| *owner == profile_id)
            .map(|(_, meal)| meal.clone())
            .collect();
        meals.sort_by_key(|meal| meal.date);
        meals
    }

    /// Stored workouts of a profile, any date
    pub async fn wods_of(&self, profile_id: Uuid) -> Vec<WodEntry> {
        let store = self.store.read().await;
        store
            .wods
            .values()
            .filter(|(owner, _)| *owner == profile_id)
            .map(|(_, wod)| wod.clone())
            .collect()
    }

    fn check_write(&self) -> AppResult<()> {
        if self.faults.offline.load(Ordering::SeqCst) {
            return Err(AppError::remote_write_failed("store is offline"));
        }
        let failed = self
            .faults
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(AppError::remote_write_failed("injected write failure"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_read(&self) -> AppResult<()> {
        if self.faults.offline.load(Ordering::SeqCst) {
            return Err(AppError::remote_read_failed("store is offline"));
        }
        Ok(())
    }

    fn meals_on(store: &Store, profile_id: Uuid, date: NaiveDate) -> Vec<MealEntry> {
        store
            .meals
            .values()
            .filter(|(owner, meal)| *owner == profile_id && meal.date == date)
            .map(|(_, meal)| meal.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteSyncAdapter for InMemorySyncAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert_meal(&self, profile_id: Uuid, meal: &MealEntry) -> AppResult<()> {
        self.check_write()?;
        debug!(meal.id = %meal.id, "Upserting meal");
        self.store
            .write()
            .await
            .meals
            .insert(meal.id, (profile_id, meal.clone()));
        Ok(())
    }

    async fn insert_water_log(&self, profile_id: Uuid, log: &WaterLog) -> AppResult<()> {
        self.check_write()?;
        self.store
            .write()
            .await
            .water
            .insert(log.id, (profile_id, *log));
        Ok(())
    }

    async fn insert_wod(&self, profile_id: Uuid, wod: &WodEntry) -> AppResult<()> {
        self.check_write()?;
        self.store
            .write()
            .await
            .wods
            .insert(wod.id, (profile_id, wod.clone()));
        Ok(())
    }

    async fn delete_meal(&self, id: Uuid) -> AppResult<()> {
        self.check_write()?;
        self.store.write().await.meals.remove(&id);
        Ok(())
    }

    async fn delete_wod(&self, id: Uuid) -> AppResult<()> {
        self.check_write()?;
        self.store.write().await.wods.remove(&id);
        Ok(())
    }

    async fn fetch_today_meal_totals(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<MealTotals> {
        self.check_read()?;
        let store = self.store.read().await;
        Ok(MealTotals::sum(&Self::meals_on(&store, profile_id, date)))
    }

    async fn fetch_today_meals(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<MealEntry>> {
        self.meal_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        let store = self.store.read().await;
        Ok(Self::meals_on(&store, profile_id, date))
    }

    async fn fetch_today_water_ml(&self, profile_id: Uuid, date: NaiveDate) -> AppResult<u32> {
        self.check_read()?;
        let store = self.store.read().await;
        Ok(store
            .water
            .values()
            .filter(|(owner, log)| *owner == profile_id && log.date == date)
            .fold(0_u32, |acc, (_, log)| acc.saturating_add(log.amount_ml)))
    }

    async fn fetch_all_wods(&self, profile_id: Uuid) -> AppResult<Vec<WodEntry>> {
        self.check_read()?;
        let mut wods = self.wods_of(profile_id).await;
        wods.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(wods)
    }

    async fn fetch_profile(&self, auth_id: &str) -> AppResult<Option<Profile>> {
        self.check_read()?;
        Ok(self.store.read().await.profiles.get(auth_id).cloned())
    }

    async fn save_profile(&self, profile: &Profile) -> AppResult<()> {
        self.check_write()?;
        self.store
            .write()
            .await
            .profiles
            .insert(profile.auth_id().to_owned(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use pritness_core::models::MealType;

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let adapter = InMemorySyncAdapter::new();
        let profile_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let meal = MealEntry::new("Toast", MealTotals::default(), MealType::Breakfast, date);

        adapter.fail_next_writes(1);
        let error = adapter.insert_meal(profile_id, &meal).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::RemoteWriteFailed);

        adapter.insert_meal(profile_id, &meal).await.unwrap();
        adapter.insert_meal(profile_id, &meal).await.unwrap();
        assert_eq!(adapter.meals_of(profile_id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_offline_reads_fail() {
        let adapter = InMemorySyncAdapter::new();
        adapter.set_offline(true);
        let error = adapter.fetch_all_wods(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::RemoteReadFailed);
    }
}
