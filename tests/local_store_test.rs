// ABOUTME: Integration tests for the per-profile JSON cache
// ABOUTME: Ledger snapshot, preferences and weights survive a reload; corrupt files fall back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::NaiveDate;
use common::{init_test_logging, utc};
use pritness::ledger::LedgerSnapshot;
use pritness::local_store::LocalStore;
use pritness::models::{DailyTotals, MealEntry, MealTotals, MealType};
use pritness_intelligence::{FoodPreferences, WeightHistory};
use tempfile::TempDir;
use tokio::fs;
use uuid::Uuid;

fn store() -> (TempDir, LocalStore) {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    (dir, store)
}

fn snapshot(profile_id: Uuid) -> LedgerSnapshot {
    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let meal = MealEntry::new(
        "Avocado toast",
        MealTotals {
            calories: 350,
            protein_g: 10,
            carbs_g: 30,
            fat_g: 20,
        },
        MealType::Breakfast,
        date,
    );
    LedgerSnapshot {
        profile_id,
        date,
        totals: DailyTotals {
            eaten_kcal: 350,
            protein_eaten_g: 10,
            carbs_eaten_g: 30,
            fat_eaten_g: 20,
            water_ml: 500,
            ..DailyTotals::default()
        },
        meals: vec![meal],
        wods: Vec::new(),
    }
}

#[tokio::test]
async fn test_missing_files_yield_defaults() {
    let (_dir, store) = store();
    let profile_id = Uuid::new_v4();

    assert!(store.load_snapshot(profile_id).await.is_none());
    assert_eq!(store.load_preferences(profile_id).await, FoodPreferences::default());
    assert!(store.load_weights(profile_id).await.entries().is_empty());
}

#[tokio::test]
async fn test_snapshot_survives_reload() {
    let (dir, store) = store();
    let profile_id = Uuid::new_v4();
    let saved = snapshot(profile_id);

    store.save_snapshot(&saved).await.unwrap();

    let reopened = LocalStore::new(dir.path());
    assert_eq!(reopened.load_snapshot(profile_id).await, Some(saved));
    assert!(dir
        .path()
        .join(profile_id.to_string())
        .join("ledger.json")
        .exists());
}

#[tokio::test]
async fn test_preferences_and_weights_are_per_profile() {
    let (_dir, store) = store();
    let ana = Uuid::new_v4();
    let luis = Uuid::new_v4();

    let mut preferences = FoodPreferences::default();
    preferences.dislike("Liver");
    preferences.like("Ceviche");
    store.save_preferences(ana, &preferences).await.unwrap();

    let mut weights = WeightHistory::default();
    weights.record(64.0, utc(2025, 3, 1, 7, 0)).unwrap();
    weights.record(63.1, utc(2025, 3, 8, 7, 0)).unwrap();
    store.save_weights(ana, &weights).await.unwrap();

    assert_eq!(store.load_preferences(ana).await, preferences);
    assert_eq!(store.load_weights(ana).await, weights);
    assert_eq!(store.load_preferences(luis).await, FoodPreferences::default());
    assert!(store.load_weights(luis).await.latest().is_none());
}

#[tokio::test]
async fn test_corrupt_files_fall_back_to_defaults() {
    let (dir, store) = store();
    let profile_id = Uuid::new_v4();
    let profile_dir = dir.path().join(profile_id.to_string());
    fs::create_dir_all(&profile_dir).await.unwrap();
    fs::write(profile_dir.join("ledger.json"), b"{\"profile_id\":")
        .await
        .unwrap();
    fs::write(profile_dir.join("preferences.json"), b"[1,2,3]")
        .await
        .unwrap();

    assert!(store.load_snapshot(profile_id).await.is_none());
    assert_eq!(store.load_preferences(profile_id).await, FoodPreferences::default());

    // A later save replaces the corrupt file
    store.save_snapshot(&snapshot(profile_id)).await.unwrap();
    assert!(store.load_snapshot(profile_id).await.is_some());
}

#[tokio::test]
async fn test_overwrite_keeps_latest_value() {
    let (_dir, store) = store();
    let profile_id = Uuid::new_v4();
    let mut first = snapshot(profile_id);
    store.save_snapshot(&first).await.unwrap();

    first.totals.water_ml = 1250;
    store.save_snapshot(&first).await.unwrap();

    let loaded = store.load_snapshot(profile_id).await.unwrap();
    assert_eq!(loaded.totals.water_ml, 1250);
}
