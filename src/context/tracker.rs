// ABOUTME: Shared tracker dependencies and the profile registration and loading entry points
// ABOUTME: Missing profiles surface as ProfileNotFound so callers route to registration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use std::sync::Arc;

use pritness_core::models::{Profile, ProfileDraft};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use super::session::TrackerSession;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::estimation::{LlmEstimationGateway, NutritionEstimationGateway};
use crate::ledger::{Clock, DailyLedger, SystemClock};
use crate::local_store::LocalStore;
use crate::sync::{InMemorySyncAdapter, RemoteSyncAdapter, RemoteWriteQueue, RestSyncAdapter};

/// Process-wide collaborators
#[derive(Clone)]
pub struct TrackerContext {
    config: Arc<AppConfig>,
    clock: Arc<dyn Clock>,
    gateway: Arc<dyn NutritionEstimationGateway>,
    writes: Arc<RemoteWriteQueue>,
    store: LocalStore,
}

impl TrackerContext {
    /// Wire explicit collaborators
    #[must_use]
    pub fn new(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        sync: Arc<dyn RemoteSyncAdapter>,
        gateway: Arc<dyn NutritionEstimationGateway>,
        store: LocalStore,
    ) -> Self {
        let writes = Arc::new(RemoteWriteQueue::new(sync, config.write_queue));
        Self {
            config: Arc::new(config),
            clock,
            gateway,
            writes,
            store,
        }
    }

    /// Build production collaborators from configuration
    ///
    /// Without a remote store the tracker runs against an in-memory adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the remote store URL or a provider is invalid.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let sync: Arc<dyn RemoteSyncAdapter> = match &config.remote {
            Some(remote) => Arc::new(RestSyncAdapter::new(remote)?),
            None => {
                warn!("No remote store configured, data stays in memory for this process");
                Arc::new(InMemorySyncAdapter::new())
            }
        };
        let gateway = Arc::new(LlmEstimationGateway::from_config(&config)?);
        let store = LocalStore::new(config.data_dir.clone());
        info!(
            sync = sync.name(),
            estimator_configured = gateway.is_configured(),
            "Tracker context ready"
        );
        Ok(Self::new(config, Arc::new(SystemClock), sync, gateway, store))
    }

    /// Loaded configuration
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Time source
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Estimation gateway
    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn NutritionEstimationGateway> {
        &self.gateway
    }

    /// Remote write queue
    #[must_use]
    pub fn writes(&self) -> &Arc<RemoteWriteQueue> {
        &self.writes
    }

    /// Remote store adapter
    #[must_use]
    pub fn sync(&self) -> &Arc<dyn RemoteSyncAdapter> {
        self.writes.adapter()
    }

    /// Local JSON cache
    #[must_use]
    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Start the background write worker
    #[must_use]
    pub fn spawn_write_worker(&self) -> JoinHandle<()> {
        Arc::clone(&self.writes).spawn_worker()
    }

    /// Create and persist a profile for `auth_id`, then open its session
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricInput` for out-of-range biometrics and
    /// `RemoteWriteFailed` when the profile cannot be stored.
    pub async fn register_profile(
        &self,
        auth_id: &str,
        draft: ProfileDraft,
    ) -> AppResult<TrackerSession> {
        let profile = Profile::new(Uuid::new_v4(), auth_id, draft)?;
        self.sync().save_profile(&profile).await?;
        info!(profile.id = %profile.id(), "Profile registered");
        self.open_session(profile).await
    }

    /// Load the profile of `auth_id` and open its session
    ///
    /// A failed ledger sync is not fatal; the session starts from the local
    /// cache and can sync again later.
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound` when no profile exists for `auth_id`, or
    /// `RemoteReadFailed` when the profile cannot be fetched.
    pub async fn load_session(&self, auth_id: &str) -> AppResult<TrackerSession> {
        let profile = self
            .sync()
            .fetch_profile(auth_id)
            .await?
            .ok_or_else(|| AppError::profile_not_found(auth_id))?;
        self.open_session(profile).await
    }

    async fn open_session(&self, profile: Profile) -> AppResult<TrackerSession> {
        let profile_id = profile.id();
        let mut ledger = DailyLedger::new(
            Arc::clone(&self.clock),
            Arc::clone(&self.writes),
            self.config.ledger,
        );
        ledger.attach_profile(profile_id, profile.timezone());
        if let Some(snapshot) = self.store.load_snapshot(profile_id).await {
            ledger.restore_snapshot(snapshot);
        }
        let preferences = self.store.load_preferences(profile_id).await;
        let weights = self.store.load_weights(profile_id).await;

        let mut session = TrackerSession::new(self.clone(), profile, ledger, preferences, weights);
        if let Err(error) = session.sync().await {
            warn!(profile.id = %profile_id, error = %error, "Initial ledger sync failed, using local cache");
        }
        Ok(session)
    }
}
