// ABOUTME: Integration tests for the tracker context and per-profile session
// ABOUTME: Registration, loading, cached days, suggestions fallback, preferences, weight and chat
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fixed_clock, sample_draft, tracker_context, ScriptedProvider};
use pritness::errors::{AppError, ErrorCode};
use pritness::intelligence::{compute_targets, Goal};
use pritness::ledger::SyncOutcome;
use pritness::llm::LlmCapabilities;
use pritness::models::{EntrySource, MealTotals};
use pritness::sync::{InMemorySyncAdapter, RemoteSyncAdapter};
use pritness_intelligence::Feedback;
use tempfile::TempDir;

fn bowl() -> MealTotals {
    MealTotals {
        calories: 450,
        protein_g: 35,
        carbs_g: 40,
        fat_g: 12,
    }
}

#[tokio::test]
async fn test_unknown_account_has_no_profile() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let context = tracker_context(dir.path(), fixed_clock(2025, 3, 10, 13, 0), &adapter, &[]);

    let err = context.load_session("nobody").await.err().unwrap();
    assert_eq!(err.code, ErrorCode::ProfileNotFound);
}

#[tokio::test]
async fn test_registration_rejects_invalid_biometrics() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let context = tracker_context(dir.path(), fixed_clock(2025, 3, 10, 13, 0), &adapter, &[]);

    let mut draft = sample_draft(Goal::LoseWeight, "UTC");
    draft.biometrics.age = 9;
    let err = context.register_profile("auth-ana", draft).await.err().unwrap();

    assert_eq!(err.code, ErrorCode::InvalidBiometricInput);
    assert!(adapter.fetch_profile("auth-ana").await.unwrap().is_none());
}

#[tokio::test]
async fn test_registered_profile_reloads_with_its_day() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let clock = fixed_clock(2025, 3, 10, 13, 0);
    let context = tracker_context(dir.path(), clock.clone(), &adapter, &[]);

    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();
    let profile_id = session.profile().id();
    session.log_manual_meal("Chicken bowl", bowl()).await;
    session.add_water(500).await.unwrap();

    let summary = session.summary();
    assert_eq!(summary.totals.eaten_kcal, 450);
    assert_eq!(summary.totals.water_ml, 500);
    assert_eq!(
        summary.remaining_calories,
        session.profile().targets().daily_calories_target - 450
    );
    // Pushes the queued writes; the day itself is already synced
    session.sync().await.unwrap();
    assert_eq!(adapter.meals_of(profile_id).await.len(), 1);

    let reopened = tracker_context(dir.path(), clock, &adapter, &[])
        .load_session("auth-ana")
        .await
        .unwrap();
    assert_eq!(reopened.profile().id(), profile_id);
    assert_eq!(reopened.ledger().totals().eaten_kcal, 450);
    assert_eq!(reopened.ledger().totals().water_ml, 500);
    assert_eq!(reopened.ledger().meals()[0].name, "Chicken bowl");
    assert!(reopened.ledger().is_authoritative());
}

#[tokio::test]
async fn test_refresh_keeps_meal_whose_write_failed() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let context = tracker_context(dir.path(), fixed_clock(2025, 3, 10, 13, 0), &adapter, &[]);
    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();

    adapter.fail_next_writes(1);
    let id = session.log_manual_meal("Chicken bowl", bowl()).await;
    let outcome = session.refresh().await.unwrap();

    assert_eq!(outcome, SyncOutcome::Synced);
    assert_eq!(context.writes().pending_len(), 1);
    assert_eq!(session.ledger().totals().eaten_kcal, 450);
    assert_eq!(session.ledger().meals().len(), 1);
    assert_eq!(session.ledger().meals()[0].id, id);

    // Once the store accepts the write the remote day agrees
    session.refresh().await.unwrap();
    assert!(context.writes().is_idle());
    assert_eq!(adapter.meals_of(session.profile().id()).await.len(), 1);
    assert_eq!(session.ledger().totals().eaten_kcal, 450);
}

#[tokio::test]
async fn test_profile_edit_is_saved_remotely() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let context = tracker_context(dir.path(), fixed_clock(2025, 3, 10, 13, 0), &adapter, &[]);
    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();
    let before = *session.profile().targets();

    session
        .edit_profile(sample_draft(Goal::GainMuscle, "UTC"))
        .unwrap();
    assert!(session.profile().targets().daily_calories_target > before.daily_calories_target);

    session.refresh().await.unwrap();
    let stored = adapter.fetch_profile("auth-ana").await.unwrap().unwrap();
    assert_eq!(stored.goal(), Goal::GainMuscle);
    assert_eq!(stored.targets(), session.profile().targets());
}

#[tokio::test]
async fn test_estimated_meal_is_logged_in_current_slot() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let provider = ScriptedProvider::new("groq", LlmCapabilities::text_only());
    provider.answer(r#"{"calories": 520.4, "protein": 31, "carbs": 48, "fat": 18, "description": "Beef and rice"}"#);
    let context = tracker_context(
        dir.path(),
        fixed_clock(2025, 3, 10, 8, 30),
        &adapter,
        &[provider],
    );
    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::LoseWeight, "UTC"))
        .await
        .unwrap();

    let estimate = session
        .analyze_meal_text("beef with rice")
        .await
        .unwrap()
        .unwrap();
    let id = session
        .log_estimated_meal(estimate, Some("beef with rice".to_owned()), EntrySource::Manual)
        .await;

    let meal = session.ledger().meal(id).unwrap();
    assert_eq!(meal.calories, 520);
    assert_eq!(meal.meal_type.as_str(), "breakfast");
    assert_eq!(meal.source, EntrySource::Manual);
    assert_eq!(session.ledger().totals().protein_eaten_g, 31);
}

#[tokio::test]
async fn test_superseded_estimate_failure_is_discarded() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let provider = ScriptedProvider::new("groq", LlmCapabilities::text_only());
    provider.fail_after(
        AppError::estimation_failed("groq", "timeout"),
        Duration::from_millis(50),
    );
    provider.answer(r#"{"calories": 300, "protein": 20, "carbs": 30, "fat": 10}"#);
    let context = tracker_context(
        dir.path(),
        fixed_clock(2025, 3, 10, 13, 0),
        &adapter,
        &[provider],
    );
    let session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();

    let (stale, fresh) = tokio::join!(
        session.analyze_meal_text("a sandwich"),
        session.analyze_meal_text("a small sandwich"),
    );

    assert!(stale.unwrap().is_none());
    assert_eq!(fresh.unwrap().unwrap().calories, 300);
}

#[tokio::test]
async fn test_target_cross_check_compares_with_local_targets() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let provider = ScriptedProvider::new("groq", LlmCapabilities::text_only());
    let context = tracker_context(
        dir.path(),
        fixed_clock(2025, 3, 10, 13, 0),
        &adapter,
        &[Arc::clone(&provider)],
    );
    let session = context
        .register_profile("auth-ana", sample_draft(Goal::LoseWeight, "UTC"))
        .await
        .unwrap();
    let local = *session.profile().targets();
    provider.answer(&format!(
        r#"{{"dailyCaloriesTarget": {}, "proteinTarget": {}, "carbsTarget": {}, "fatTarget": {}}}"#,
        local.daily_calories_target + 20,
        local.protein_target_g,
        local.carbs_target_g,
        local.fat_target_g + 2,
    ));
    provider.answer(r#"{"dailyCaloriesTarget": 3400, "proteinTarget": 210}"#);

    let check = session.cross_check_targets().await.unwrap().unwrap();
    assert_eq!(check.computed, local);
    assert_eq!(check.calorie_delta(), 20);
    assert!(check.agrees());
    let prompt = provider.last_request().unwrap().messages[1].content.clone();
    assert!(prompt.contains("Weight: 60 kg"));
    assert!(prompt.contains("goal: lose_weight"));

    let check = session.cross_check_targets().await.unwrap().unwrap();
    assert!(!check.agrees());
    assert_eq!(check.estimated.daily_calories_target, 3400);
    // Omitted fields take fallback values
    assert_eq!(check.estimated.carbs_target_g, 200);
    assert_eq!(check.estimated.fat_target_g, 65);
    assert_eq!(
        check.computed,
        compute_targets(local.basal_metabolic_rate, Goal::LoseWeight)
    );
}

#[tokio::test]
async fn test_suggestions_fall_back_to_static_menu() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let provider = ScriptedProvider::new("groq", LlmCapabilities::text_only());
    provider.fail(AppError::estimation_failed("groq", "upstream unavailable"));
    let context = tracker_context(
        dir.path(),
        fixed_clock(2025, 3, 10, 13, 0),
        &adapter,
        &[provider],
    );
    let session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();

    let suggestions = session.suggest_meals().await.unwrap();
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].label, "Chicken breast with brown rice");
}

#[tokio::test]
async fn test_ai_suggestions_are_used_when_available() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let provider = ScriptedProvider::new("groq", LlmCapabilities::text_only());
    provider.answer(
        r#"[{"label": "Lentil stew", "description": "Hearty", "calories": 480, "protein": 26, "carbs": 60, "fat": 9, "imageCategory": "soup"}]"#,
    );
    let context = tracker_context(
        dir.path(),
        fixed_clock(2025, 3, 10, 21, 0),
        &adapter,
        &[provider],
    );
    let session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();

    let suggestions = session.suggest_meals().await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].label, "Lentil stew");
}

#[tokio::test]
async fn test_rated_foods_steer_recommendations_and_persist() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let clock = fixed_clock(2025, 3, 10, 13, 0);
    let context = tracker_context(dir.path(), clock.clone(), &adapter, &[]);
    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();

    session.rate_food("Tuna salad", Feedback::Dislike).await.unwrap();
    session.rate_food("Ceviche", Feedback::Like).await.unwrap();

    let recommendation = session.recommendation_context();
    assert_eq!(recommendation.disliked_foods, vec!["Tuna salad".to_owned()]);
    assert_eq!(recommendation.country.as_deref(), Some("Chile"));

    let reopened = tracker_context(dir.path(), clock, &adapter, &[])
        .load_session("auth-ana")
        .await
        .unwrap();
    assert_eq!(
        reopened.preferences().liked().collect::<Vec<_>>(),
        vec!["Ceviche"]
    );
}

#[tokio::test]
async fn test_logged_weight_drives_workout_estimates() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let provider = ScriptedProvider::new("groq", LlmCapabilities::text_only());
    provider.answer(r#"{"estimatedCaloriesBurned": 310, "exercises": ["rowing"], "description": "Intervals"}"#);
    let clock = fixed_clock(2025, 3, 10, 18, 0);
    let context = tracker_context(dir.path(), clock.clone(), &adapter, &[Arc::clone(&provider)]);
    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::LoseWeight, "UTC"))
        .await
        .unwrap();

    assert!((session.current_weight_kg() - 60.0).abs() < f64::EPSILON);
    session.log_weight(64.2).await.unwrap();
    assert!(session.log_weight(400.0).await.is_err());
    assert!((session.current_weight_kg() - 64.2).abs() < f64::EPSILON);

    let workout = session
        .estimate_workout("20 minutes of rowing intervals")
        .await
        .unwrap()
        .unwrap();
    let prompt = provider.last_request().unwrap().messages[0].content.clone();
    assert!(prompt.contains("64 kg"));

    session.log_workout(workout, EntrySource::Manual).await;
    assert_eq!(session.ledger().totals().burned_kcal, 310);

    let reopened = tracker_context(dir.path(), clock, &adapter, &[])
        .load_session("auth-ana")
        .await
        .unwrap();
    assert_eq!(reopened.weights().entries().len(), 1);
}

#[tokio::test]
async fn test_chat_keeps_bounded_history() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let provider = ScriptedProvider::new("groq", LlmCapabilities::text_only());
    for i in 0..25 {
        provider.answer(&format!("reply {i}"));
    }
    provider.answer("   ");
    let context = tracker_context(
        dir.path(),
        fixed_clock(2025, 3, 10, 13, 0),
        &adapter,
        &[provider],
    );
    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();

    for i in 0..25 {
        let reply = session.send_chat(&format!("question {i}")).await.unwrap();
        assert_eq!(reply.as_deref(), Some(format!("reply {i}").as_str()));
    }
    assert_eq!(session.chat_history().len(), 40);
    assert_eq!(session.chat_history()[0].content, "question 5");
    assert_eq!(session.chat_history()[39].content, "reply 24");

    // A failed reply stores neither turn
    assert!(session.send_chat("anything else?").await.is_err());
    assert_eq!(session.chat_history().len(), 40);
    assert_eq!(session.chat_history()[39].content, "reply 24");
}

#[tokio::test]
async fn test_chat_without_provider_is_not_configured() {
    let dir = TempDir::new().unwrap();
    let adapter = InMemorySyncAdapter::new();
    let context = tracker_context(dir.path(), fixed_clock(2025, 3, 10, 13, 0), &adapter, &[]);
    let mut session = context
        .register_profile("auth-ana", sample_draft(Goal::DefineMuscle, "UTC"))
        .await
        .unwrap();

    let err = session.send_chat("hello").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EstimatorNotConfigured);
    assert!(session.chat_history().is_empty());
}
