// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides fixed clocks, profiles, ledger wiring and a scripted LLM provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `pritness`

use std::collections::VecDeque;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use pritness::config::{AppConfig, LedgerConfig, RateLimitRetryConfig, WriteQueueConfig};
use pritness::context::TrackerContext;
use pritness::errors::{AppError, AppResult};
use pritness::estimation::LlmEstimationGateway;
use pritness::intelligence::{BiometricInput, Goal, Sex};
use pritness::ledger::{DailyLedger, FixedClock};
use pritness::llm::{
    ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, RateLimitRetry, SharedProvider,
};
use pritness::local_store::LocalStore;
use pritness::models::{Profile, ProfileDraft};
use pritness::sync::{InMemorySyncAdapter, RemoteWriteQueue};
use tokio::time::sleep;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// UTC instant helper
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test instant")
}

/// Clock frozen at a UTC instant
pub fn fixed_clock(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(utc(year, month, day, hour, minute)))
}

/// Draft for a 30 year old, 165 cm, 60 kg woman
pub fn sample_draft(goal: Goal, timezone: &str) -> ProfileDraft {
    ProfileDraft {
        name: "Ana".to_owned(),
        biometrics: BiometricInput {
            weight_kg: 60.0,
            height_cm: 165.0,
            age: 30,
            sex: Sex::Female,
        },
        goal,
        country: Some("Chile".to_owned()),
        timezone: timezone.to_owned(),
    }
}

/// Stored profile in UTC
pub fn sample_profile(goal: Goal) -> Profile {
    Profile::new(Uuid::new_v4(), "auth-ana", sample_draft(goal, "UTC")).unwrap()
}

/// Write queue tuned for fast tests
pub fn test_queue_config() -> WriteQueueConfig {
    WriteQueueConfig {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(100),
    }
}

/// Ledger wired to an in-memory store
pub struct LedgerFixture {
    pub ledger: DailyLedger,
    pub adapter: InMemorySyncAdapter,
    pub writes: Arc<RemoteWriteQueue>,
    pub clock: Arc<FixedClock>,
    pub profile_id: Uuid,
}

/// Ledger attached to a fresh profile in `timezone`
pub fn ledger_fixture(clock: Arc<FixedClock>, timezone: Tz) -> LedgerFixture {
    init_test_logging();
    let adapter = InMemorySyncAdapter::new();
    let writes = Arc::new(RemoteWriteQueue::new(
        Arc::new(adapter.clone()),
        test_queue_config(),
    ));
    let mut ledger = DailyLedger::new(clock.clone(), Arc::clone(&writes), LedgerConfig::default());
    let profile_id = Uuid::new_v4();
    ledger.attach_profile(profile_id, timezone);
    LedgerFixture {
        ledger,
        adapter,
        writes,
        clock,
        profile_id,
    }
}

/// One scripted answer, delivered after `delay`
struct Scripted {
    delay: Duration,
    outcome: AppResult<String>,
}

/// LLM provider answering from a script
pub struct ScriptedProvider {
    name: &'static str,
    capabilities: LlmCapabilities,
    answers: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, capabilities: LlmCapabilities) -> Arc<Self> {
        Arc::new(Self {
            name,
            capabilities,
            answers: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue a successful answer
    pub fn answer(&self, text: &str) -> &Self {
        self.script(Duration::ZERO, Ok(text.to_owned()))
    }

    /// Queue a failure
    pub fn fail(&self, error: AppError) -> &Self {
        self.script(Duration::ZERO, Err(error))
    }

    /// Queue a failure that arrives only after `delay`
    pub fn fail_after(&self, error: AppError, delay: Duration) -> &Self {
        self.script(delay, Err(error))
    }

    fn script(&self, delay: Duration, outcome: AppResult<String>) -> &Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Scripted { delay, outcome });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn display_name(&self) -> &'static str {
        self.name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.answers.lock().unwrap().pop_front();
        let Some(Scripted { delay, outcome }) = next else {
            return Err(AppError::estimation_failed(self.name, "script exhausted"));
        };
        if !delay.is_zero() {
            sleep(delay).await;
        }
        outcome.map(|content| ChatResponse {
            content,
            model: "scripted-model".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }
}

/// Retry policy with short delays
pub fn fast_retry() -> RateLimitRetry {
    RateLimitRetry::new(RateLimitRetryConfig {
        max_retries: 2,
        base_delay: Duration::from_millis(5),
    })
}

/// Gateway over scripted providers
pub fn scripted_gateway(providers: &[Arc<ScriptedProvider>]) -> LlmEstimationGateway {
    let shared: Vec<SharedProvider> = providers
        .iter()
        .map(|p| Arc::clone(p) as SharedProvider)
        .collect();
    LlmEstimationGateway::new(shared, fast_retry())
}

/// Offline configuration rooted at `data_dir`
pub fn test_config(data_dir: &Path) -> AppConfig {
    let mut config = AppConfig::from_lookup(|_| None).unwrap();
    config.data_dir = data_dir.to_path_buf();
    config.write_queue = test_queue_config();
    config
}

/// Tracker context over an in-memory store and scripted providers
pub fn tracker_context(
    data_dir: &Path,
    clock: Arc<FixedClock>,
    adapter: &InMemorySyncAdapter,
    providers: &[Arc<ScriptedProvider>],
) -> TrackerContext {
    init_test_logging();
    TrackerContext::new(
        test_config(data_dir),
        clock,
        Arc::new(adapter.clone()),
        Arc::new(scripted_gateway(providers)),
        LocalStore::new(data_dir),
    )
}
